//! 모듈 관계 그래프 -- `go mod graph` 출력 분석
//!
//! `go mod graph`는 한 줄에 `의존하는모듈 의존되는모듈@버전` 쌍을
//! 출력합니다. 이 모듈은 그 텍스트를 버전이 정규화된 모듈 관계
//! 그래프로 변환합니다.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ScannerError;
use crate::toolchain::GoToolchain;
use crate::version::{parse_version, to_canonical_version};

/// 모듈 경로 끝의 `/vN` 메이저 버전 접미사 분리
static MODULE_MAJOR_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)(/v[0-9]+)?$").expect("module major suffix regex"));

/// 버전이 정규화된 모듈 관계 그래프
///
/// 간선의 양 끝은 `모듈@정규버전` 문자열입니다 (루트는 버전 없음).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModulesGraph {
    /// main 모듈 경로 (첫 줄의 첫 토큰)
    pub root: String,
    /// `모듈@버전` -> 직접 의존 목록
    pub edges: BTreeMap<String, Vec<String>>,
}

/// 대상 프로젝트의 모듈 관계 그래프를 수집합니다.
///
/// `go mod graph` 실행은 toolchain 협력자에 위임하고, 실패 텍스트는
/// [`ScannerError::ResolveFailed`]로 감쌉니다.
pub fn analyze_module_graph(
    root: &Path,
    toolchain: &dyn GoToolchain,
) -> Result<ModulesGraph, ScannerError> {
    let output = toolchain
        .mod_graph(root)
        .map_err(|err| ScannerError::ResolveFailed {
            reason: err.message,
        })?;
    build_module_graph(&output)
}

/// `go mod graph` 출력 텍스트로 모듈 관계 그래프를 구성합니다.
///
/// 각 끝점의 버전은 버전 코덱의 정규 형태로 다시 씁니다
/// (`v1.2.3` -> `1.2.3`, pseudo-version -> `#<hash>`).
pub fn build_module_graph(output: &str) -> Result<ModulesGraph, ScannerError> {
    let mut graph = ModulesGraph::default();

    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Ok(graph);
    }

    for (i, line) in trimmed.lines().enumerate() {
        let mut tokens = line.split_whitespace();
        let (Some(from_raw), Some(to_raw)) = (tokens.next(), tokens.next()) else {
            continue;
        };
        if i == 0 {
            graph.root = from_raw.to_owned();
        }

        let from = module_at_version_to_canonical(from_raw)?;
        let to = module_at_version_to_canonical(to_raw)?;
        graph.edges.entry(from).or_default().push(to);
    }

    Ok(graph)
}

/// `모듈@버전` 토큰의 버전 부분을 정규화합니다.
///
/// `@`가 없는 토큰(main 모듈)은 그대로 반환합니다. `@`가 두 개
/// 이상이면 손상된 토큰으로 보고 실패합니다.
fn module_at_version_to_canonical(token: &str) -> Result<String, ScannerError> {
    let parts: Vec<&str> = token.split('@').collect();
    match parts.as_slice() {
        [module] => Ok((*module).to_owned()),
        [module, version] => {
            let canonical = to_canonical_version(&parse_version(version))?;
            Ok(format!("{module}@{canonical}"))
        }
        _ => Err(ScannerError::InvalidModuleVersion {
            value: token.to_owned(),
        }),
    }
}

/// 패키지가 모듈에 속하는지 판별합니다.
///
/// 모듈 경로의 `/vN` 메이저 버전 접미사를 제거한 뒤 접두사 비교합니다.
pub fn is_package_in_the_module(package_name: &str, module_name: &str) -> bool {
    let unversioned = MODULE_MAJOR_SUFFIX_RE
        .captures(module_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(module_name);
    package_name.starts_with(unversioned)
}

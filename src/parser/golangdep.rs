//! Gopkg.lock / Gopkg.toml 파서 (dep)
//!
//! dep의 lock 파일(`[[projects]]` 배열)에서 고정 버전 테이블을,
//! manifest의 `ignored` 배열에서 제외 패턴을 추출합니다.
//!
//! # Gopkg.lock 형식 예시
//!
//! ```toml
//! [[projects]]
//!   name = "github.com/golang/protobuf"
//!   packages = ["proto", "ptypes/any"]
//!   revision = "b4deda0973fb4c70b50d226b1af49f3da59f5265"
//!   version = "v1.1.0"
//! ```
//!
//! 각 프로젝트의 `packages` 항목마다 고정 버전 항목이 하나씩 생성됩니다.
//! `"."`은 프로젝트 자체, 그 외에는 `이름/서브패키지` 경로입니다.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::ScannerError;
use crate::types::LockedDep;

/// Gopkg.lock 구조 (파싱용)
#[derive(Deserialize)]
struct GopkgLock {
    #[serde(default)]
    projects: Vec<GopkgProject>,
}

/// Gopkg.lock 내 개별 프로젝트 (파싱용)
#[derive(Deserialize)]
struct GopkgProject {
    name: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    revision: Option<String>,
    #[serde(default)]
    packages: Vec<String>,
}

/// Gopkg.toml 구조 (파싱용)
#[derive(Deserialize)]
struct GopkgManifest {
    #[serde(default)]
    ignored: Vec<String>,
}

/// lock 내용을 파싱하여 고정 버전 테이블을 생성합니다.
///
/// 버전은 시맨틱 태그(`version`)를 우선하고, 없으면 `#<revision>`
/// 형태를 사용합니다.
///
/// # Arguments
///
/// - `content`: lock 파일 내용 (TOML)
/// - `source_path`: 원본 파일 경로 (에러 메시지용)
pub fn parse_dep_lock(
    content: &str,
    source_path: &str,
) -> Result<HashMap<String, LockedDep>, ScannerError> {
    let lock: GopkgLock = toml::from_str(content).map_err(|e| ScannerError::ManifestParse {
        path: source_path.to_owned(),
        reason: e.to_string(),
    })?;

    let mut deps = HashMap::new();
    for project in &lock.projects {
        let version = match &project.version {
            Some(v) if !v.is_empty() => v.clone(),
            _ => format!("#{}", project.revision.as_deref().unwrap_or_default()),
        };

        for subpackage in &project.packages {
            let name = if subpackage == "." {
                project.name.clone()
            } else {
                format!("{}/{}", project.name, subpackage)
            };
            deps.insert(
                name.clone(),
                LockedDep {
                    name,
                    version: version.clone(),
                },
            );
        }
    }

    Ok(deps)
}

/// manifest 내용을 파싱하여 ignore 패턴 목록을 반환합니다.
///
/// `ignored` 배열이 없으면 빈 목록입니다.
pub fn parse_dep_manifest(
    content: &str,
    source_path: &str,
) -> Result<Vec<String>, ScannerError> {
    let manifest: GopkgManifest =
        toml::from_str(content).map_err(|e| ScannerError::ManifestParse {
            path: source_path.to_owned(),
            reason: e.to_string(),
        })?;
    Ok(manifest.ignored)
}

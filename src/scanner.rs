//! 스캔 오케스트레이터 -- 전체 스캔 흐름 관리
//!
//! 대상 manifest 파일로 패키지 관리자를 판별하고, 그에 맞는 빌더로
//! 의존성 그래프 또는 트리를 구성하여 플러그인 메타데이터와 함께
//! 반환합니다.
//!
//! # 내부 아키텍처
//!
//! ```text
//! inspect(root, target_file)
//!     |
//!     +-- go.mod ------> GoToolchain::list_packages --> build_dep_graph --> DepGraphResult
//!     |
//!     +-- Gopkg.lock --+
//!     |                +-> load_project_config --> GoToolchain::resolve_legacy_graph
//!     +-- vendor.json -+        |                        |
//!                               +---- locked versions ---+--> build_dep_tree --> DepTreeResult
//! ```
//!
//! 모든 호출은 동기적이며 호출별로 상태를 소유합니다. 동시 호출 간에
//! 공유되는 전역 상태는 없습니다.

use std::fs;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use tracing::debug;

use crate::config::ScanOptions;
use crate::dep_graph::{DepGraph, GraphOptions, build_dep_graph_from_imports_and_modules};
use crate::dep_tree::{DepTree, build_dep_tree};
use crate::error::ScannerError;
use crate::golist;
use crate::import_graph::ImportGraph;
use crate::parser;
use crate::toolchain::GoToolchain;
use crate::types::{GoProjectConfig, PackageManager, PluginMetadata};

/// 플랫폼에 보고하는 플러그인 이름
pub const PLUGIN_NAME: &str = "godep-scanner";

/// 버전을 알 수 없을 때의 대체 문자열
const UNKNOWN_VERSION: &str = "unknown";

/// 그래프 모드 스캔 결과
#[derive(Debug, Clone)]
pub struct DepGraphResult {
    /// 플러그인 메타데이터
    pub plugin: PluginMetadata,
    /// 구성된 의존성 그래프
    pub dependency_graph: DepGraph,
}

/// 트리 모드 스캔 결과
#[derive(Debug, Clone)]
pub struct DepTreeResult {
    /// 플러그인 메타데이터
    pub plugin: PluginMetadata,
    /// 구성된 의존성 트리
    pub package: DepTree,
}

/// 스캔 결과 -- 대상 manifest에 따라 둘 중 하나
#[derive(Debug, Clone)]
pub enum ScanResult {
    /// go modules 프로젝트 (go.mod)
    Graph(DepGraphResult),
    /// legacy 프로젝트 (Gopkg.lock / vendor.json)
    Tree(DepTreeResult),
}

/// 프로젝트를 스캔하여 의존성 그래프 또는 트리를 생성합니다.
///
/// `go.mod` 대상은 그래프 모드로, `Gopkg.lock`/`vendor.json` 대상은
/// 트리 모드로 처리합니다. 그 외의 대상 파일은
/// [`ScannerError::UnsupportedTargetFile`]로 실패합니다.
pub fn inspect(
    root: &Path,
    target_file: &str,
    toolchain: &dyn GoToolchain,
    options: &ScanOptions,
) -> Result<ScanResult, ScannerError> {
    options.validate()?;

    let manager = PackageManager::from_target_file(Path::new(target_file)).ok_or_else(|| {
        ScannerError::UnsupportedTargetFile {
            path: target_file.to_owned(),
        }
    })?;
    debug!(target_file = %target_file, manager = %manager, "detected package manager");

    let plugin = plugin_metadata(root, target_file, toolchain);

    match manager {
        PackageManager::GoModules => {
            let stdlib_version = if options.include_go_standard_library_deps {
                resolve_stdlib_version(root, target_file, toolchain)
            } else {
                UNKNOWN_VERSION.to_owned()
            };
            let graph_options = GraphOptions::from_scan_options(options, stdlib_version);
            let dependency_graph =
                build_dep_graph_from_imports_and_modules(root, target_file, toolchain, &graph_options)?;
            debug!(
                nodes = dependency_graph.node_count(),
                edges = dependency_graph.edge_count(),
                "dep-graph built",
            );
            Ok(ScanResult::Graph(DepGraphResult {
                plugin,
                dependency_graph,
            }))
        }
        PackageManager::GolangDep | PackageManager::Govendor => {
            debug!(root = %root.display(), "parsing manifest/lockfile");
            let config = parser::load_project_config(root, target_file)?;
            let package = get_dep_tree(root, target_file, manager, &config, toolchain)?;
            debug!(root_pkg = %package.name, "dep-tree built");
            Ok(ScanResult::Tree(DepTreeResult { plugin, package }))
        }
    }
}

/// legacy resolver를 호출하고 그 그래프를 트리로 낮춥니다.
fn get_dep_tree(
    root: &Path,
    target_file: &str,
    manager: PackageManager,
    config: &GoProjectConfig,
    toolchain: &dyn GoToolchain,
) -> Result<DepTree, ScannerError> {
    debug!(ignored = config.ignored_pkgs.len(), "executing go deps resolver");
    let graph_json = toolchain
        .resolve_legacy_graph(root, &config.ignored_pkgs)
        .map_err(|err| match err.message.find("Unresolved packages:") {
            Some(offset) => ScannerError::UnresolvedPackages {
                details: err.message[offset..].to_owned(),
                sync_cmd: manager.vendor_sync_cmd().to_owned(),
            },
            None => ScannerError::ResolveFailed {
                reason: err.message,
            },
        })?;

    let mut graph = ImportGraph::from_graphlib_json(&graph_json)?;
    let project_root = project_root_from_target_file(root, target_file)?;
    build_dep_tree(&mut graph, &config.locked_versions, &project_root)
}

/// 플러그인 메타데이터를 수집합니다.
///
/// 런타임 감지 실패는 soft 조건이며 `runtime: None`으로 남습니다.
fn plugin_metadata(root: &Path, target_file: &str, toolchain: &dyn GoToolchain) -> PluginMetadata {
    let runtime = toolchain
        .version(root)
        .ok()
        .and_then(|output| golist::extract_runtime_version(&output));

    PluginMetadata {
        name: PLUGIN_NAME.to_owned(),
        runtime,
        target_file: path_to_posix(target_file),
    }
}

/// 표준 라이브러리 대체 버전을 결정합니다.
///
/// 1. go.mod의 `toolchain goX.Y.Z` 지시어
/// 2. `go version` 출력
/// 3. 둘 다 실패하면 `unknown`
fn resolve_stdlib_version(root: &Path, target_file: &str, toolchain: &dyn GoToolchain) -> String {
    let gomod_path = root.join(target_file);
    if let Ok(content) = fs::read_to_string(&gomod_path)
        && let Some(version) = golist::stdlib_version_from_gomod(&content)
    {
        return version;
    }

    if let Ok(output) = toolchain.version(root)
        && let Some(version) = golist::extract_stdlib_version(&output)
    {
        return version;
    }

    UNKNOWN_VERSION.to_owned()
}

/// 대상 manifest 파일로부터 프로젝트 루트 디렉토리를 구합니다.
///
/// `vendor.json`은 `vendor` 디렉토리 안에 있어야 하며, 프로젝트
/// 루트는 그 상위입니다.
fn project_root_from_target_file(
    root: &Path,
    target_file: &str,
) -> Result<PathBuf, ScannerError> {
    let resolved = root.join(target_file);
    let unsupported = || ScannerError::UnsupportedTargetFile {
        path: target_file.to_owned(),
    };

    match resolved.file_name().and_then(|n| n.to_str()) {
        Some("Gopkg.lock") | Some("go.mod") => Ok(resolved
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.to_path_buf())),
        Some("vendor.json") => {
            let vendor_dir = resolved.parent().ok_or_else(unsupported)?;
            if vendor_dir.file_name().and_then(|n| n.to_str()) != Some("vendor") {
                return Err(unsupported());
            }
            Ok(vendor_dir
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()))
        }
        _ => Err(unsupported()),
    }
}

/// 경로를 POSIX 구분자 표기로 바꿉니다 (메타데이터 보고용).
fn path_to_posix(path: &str) -> String {
    path.split(MAIN_SEPARATOR)
        .collect::<Vec<_>>()
        .join("/")
}

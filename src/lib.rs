#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: 도메인 에러 타입 (`ScannerError`)
//! - [`config`]: 스캔 옵션 (`ScanOptions`, 빌더)
//! - [`types`]: 도메인 타입 (`GoPackage`, `GoModule`, `PackageManager`, `PluginMetadata`)
//! - [`version`]: 모듈 버전 코덱 (`ModuleVersion`, `parse_version`, `to_canonical_version`)
//! - [`purl`]: Package URL 인코더 (`create_go_purl`)
//! - [`toolchain`]: toolchain 협력자 trait (`GoToolchain`)
//! - [`golist`]: `go list` 출력 디코딩
//! - [`parser`]: legacy manifest/lock 파서 (Gopkg.lock, Gopkg.toml, vendor.json)
//! - [`import_graph`]: resolver 그래프의 인접 리스트 표현 + 순환 검사
//! - [`dep_graph`]: 의존성 그래프 빌더 (imports+modules 모드)
//! - [`dep_tree`]: 의존성 트리 빌더 (legacy graph 모드)
//! - [`modgraph`]: `go mod graph` 모듈 관계 분석
//! - [`scanner`]: 오케스트레이터 (`inspect`, 모드 분기)

pub mod config;
pub mod dep_graph;
pub mod dep_tree;
pub mod error;
pub mod golist;
pub mod import_graph;
pub mod modgraph;
pub mod parser;
pub mod purl;
pub mod scanner;
pub mod toolchain;
pub mod types;
pub mod version;

// --- Public API Re-exports ---

// Scanner (오케스트레이터)
pub use scanner::{DepGraphResult, DepTreeResult, PLUGIN_NAME, ScanResult, inspect};

// 옵션
pub use config::{ScanOptions, ScanOptionsBuilder};

// 에러
pub use error::ScannerError;

// 도메인 타입
pub use types::{GoModule, GoPackage, GoProjectConfig, LockedDep, PackageManager, PluginMetadata};

// 그래프/트리 빌더
pub use dep_graph::{
    DepGraph, DepGraphBuilder, GraphOptions, PkgInfo, ROOT_NODE_ID,
    build_dep_graph_from_imports_and_modules, build_dep_graph_from_packages,
};
pub use dep_tree::{DepTree, VIRTUAL_ROOT_NODE_ID, build_dep_tree};
pub use import_graph::{ImportGraph, PkgNode};
pub use modgraph::{ModulesGraph, analyze_module_graph, build_module_graph};

// 버전 코덱 / Package URL
pub use purl::create_go_purl;
pub use version::{ModuleVersion, parse_version, to_canonical_version};

// Toolchain 협력자
pub use toolchain::{GoToolchain, ToolchainError};

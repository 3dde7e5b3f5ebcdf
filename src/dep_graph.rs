//! 의존성 그래프 빌더 -- imports+modules 모드
//!
//! `go list -json -deps ./...` 출력(flat 패키지 목록 + import 간선 +
//! 모듈 메타데이터)으로부터 프로젝트 루트에 뿌리를 둔 버전 부여
//! 의존성 그래프를 구성합니다.
//!
//! # 구성 규칙
//!
//! - 표준 라이브러리 패키지는 옵션 활성화 시 `std/<path>` leaf 노드로
//!   합성되며 재귀하지 않습니다.
//! - 부모 자신, 이미 연결된 자식, 경로상의 조상으로 되돌아가는 간선은
//!   건너뜁니다. 출력 형식이 순환을 표현할 수 없으므로 구성 단계에서
//!   순환을 끊습니다. 일부 경로가 손실되는 의도된 단순화입니다.
//! - 한 재귀 가지 안에서 이미 방문한 패키지는 서브트리를 다시 전개하지
//!   않고 `<path>:pruned` 노드로만 기록합니다. 다이아몬드 의존성에서의
//!   지수적 팽창을 막습니다.
//! - 순회는 목록의 역순으로 진행됩니다. 중복 import 경로의 처리 순서가
//!   출력에 영향을 주므로 결정성을 위해 이 순서를 유지합니다.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::Serialize;
use serde_json::json;

use crate::config::ScanOptions;
use crate::error::ScannerError;
use crate::golist;
use crate::purl::create_go_purl;
use crate::toolchain::GoToolchain;
use crate::types::{GoPackage, PackageManager};
use crate::version::{parse_version, to_canonical_version};

/// 루트 노드 식별자 (실제 패키지 이름과 겹치지 않는 상수)
pub const ROOT_NODE_ID: &str = "root-node";

/// 모듈 메타데이터가 없는 패키지의 버전
const UNKNOWN_VERSION: &str = "unknown";

/// 그래프 노드가 나타내는 패키지
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PkgInfo {
    /// 패키지 이름 (import 경로)
    pub name: String,
    /// 정규화된 버전
    pub version: String,
    /// Package URL (옵션 활성화 시)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purl: Option<String>,
}

/// 그래프 구성 옵션
///
/// [`ScanOptions`]에 실행 시점에 결정되는 표준 라이브러리 대체 버전을
/// 더한 형태입니다.
#[derive(Debug, Clone)]
pub struct GraphOptions {
    /// 표준 라이브러리 노드에 부여할 버전
    pub stdlib_version: String,
    /// 표준 라이브러리 패키지 포함 여부
    pub include_go_standard_library_deps: bool,
    /// Package URL 생성 여부
    pub include_package_urls: bool,
    /// listing 명령 추가 인자
    pub additional_args: Vec<String>,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            stdlib_version: UNKNOWN_VERSION.to_owned(),
            include_go_standard_library_deps: false,
            include_package_urls: false,
            additional_args: Vec::new(),
        }
    }
}

impl GraphOptions {
    /// 스캔 옵션과 대체 버전으로 그래프 옵션을 생성합니다.
    pub fn from_scan_options(options: &ScanOptions, stdlib_version: String) -> Self {
        Self {
            stdlib_version,
            include_go_standard_library_deps: options.include_go_standard_library_deps,
            include_package_urls: options.include_package_urls,
            additional_args: options.additional_args.clone(),
        }
    }
}

/// 그래프 노드 (내부 표현)
#[derive(Debug, Clone)]
struct GraphNode {
    node_id: String,
    info: PkgInfo,
    deps: Vec<String>,
    labels: BTreeMap<String, String>,
}

/// 완성된 의존성 그래프
///
/// 노드 식별자는 유일하고, 모든 간선의 양 끝은 노드로 존재합니다.
/// 노드 열거는 삽입 순서를 유지하므로 동일 입력에 대해 직렬화 결과가
/// 바이트 단위로 동일합니다.
#[derive(Debug, Clone)]
pub struct DepGraph {
    pkg_manager: String,
    nodes: Vec<GraphNode>,
    index: HashMap<String, usize>,
}

impl DepGraph {
    /// 패키지 관리자 이름을 반환합니다.
    pub fn pkg_manager(&self) -> &str {
        &self.pkg_manager
    }

    /// 루트 노드 식별자를 반환합니다.
    pub fn root_node_id(&self) -> &str {
        ROOT_NODE_ID
    }

    /// 루트 패키지를 반환합니다.
    pub fn root_pkg(&self) -> &PkgInfo {
        // 루트 노드는 빌더 생성 시 항상 첫 노드로 추가됨
        &self.nodes[0].info
    }

    /// 노드 식별자 목록을 삽입 순서로 반환합니다.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.node_id.as_str())
    }

    /// 노드의 패키지 정보를 조회합니다.
    pub fn pkg_info(&self, node_id: &str) -> Option<&PkgInfo> {
        self.index.get(node_id).map(|&i| &self.nodes[i].info)
    }

    /// 노드의 자식 노드 식별자 목록을 반환합니다.
    pub fn deps_of(&self, node_id: &str) -> &[String] {
        self.index
            .get(node_id)
            .map(|&i| self.nodes[i].deps.as_slice())
            .unwrap_or(&[])
    }

    /// 노드의 라벨을 반환합니다 (예: `pruned: "true"`).
    pub fn labels_of(&self, node_id: &str) -> Option<&BTreeMap<String, String>> {
        self.index
            .get(node_id)
            .map(|&i| &self.nodes[i].labels)
            .filter(|labels| !labels.is_empty())
    }

    /// 노드 수를 반환합니다.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// 간선 수를 반환합니다.
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.deps.len()).sum()
    }

    /// 그래프를 플랫폼이 소비하는 JSON 문서로 직렬화합니다.
    ///
    /// `pkgs`는 `이름@버전` 단위로 중복을 제거하며, 노드는 자신의
    /// 패키지 항목을 `pkgId`로 참조합니다.
    pub fn to_json(&self) -> serde_json::Value {
        let mut pkg_ids: Vec<String> = Vec::new();
        let mut pkgs: Vec<serde_json::Value> = Vec::new();
        for node in &self.nodes {
            let pkg_id = format!("{}@{}", node.info.name, node.info.version);
            if !pkg_ids.contains(&pkg_id) {
                pkgs.push(json!({
                    "id": &pkg_id,
                    "info": &node.info,
                }));
                pkg_ids.push(pkg_id);
            }
        }

        let nodes: Vec<serde_json::Value> = self
            .nodes
            .iter()
            .map(|node| {
                let deps: Vec<serde_json::Value> =
                    node.deps.iter().map(|d| json!({ "nodeId": d })).collect();
                let mut entry = json!({
                    "nodeId": &node.node_id,
                    "pkgId": format!("{}@{}", node.info.name, node.info.version),
                    "deps": deps,
                });
                if !node.labels.is_empty() {
                    entry["info"] = json!({ "labels": &node.labels });
                }
                entry
            })
            .collect();

        json!({
            "schemaVersion": "1.2.0",
            "pkgManager": { "name": &self.pkg_manager },
            "pkgs": pkgs,
            "graph": {
                "rootNodeId": ROOT_NODE_ID,
                "nodes": nodes,
            },
        })
    }
}

/// [`DepGraph`] 빌더
///
/// 노드 추가는 식별자 기준으로 멱등적이고(먼저 추가된 정보가 유지됨),
/// 간선 연결은 중복을 제거합니다. 양 끝이 존재하지 않는 간선은
/// 기록되지 않습니다.
#[derive(Debug)]
pub struct DepGraphBuilder {
    graph: DepGraph,
}

impl DepGraphBuilder {
    /// 루트 패키지로 빌더를 생성합니다.
    ///
    /// 루트는 [`ROOT_NODE_ID`] 식별자의 첫 노드로 추가됩니다.
    pub fn new(pkg_manager: PackageManager, root_pkg: PkgInfo) -> Self {
        let mut builder = Self {
            graph: DepGraph {
                pkg_manager: pkg_manager.to_string(),
                nodes: Vec::new(),
                index: HashMap::new(),
            },
        };
        builder.add_pkg_node(root_pkg, ROOT_NODE_ID);
        builder
    }

    /// 노드를 추가합니다. 이미 있는 식별자는 무시됩니다.
    pub fn add_pkg_node(&mut self, info: PkgInfo, node_id: &str) {
        self.add_pkg_node_with_labels(info, node_id, &[]);
    }

    /// 라벨이 붙은 노드를 추가합니다.
    pub fn add_pkg_node_with_labels(
        &mut self,
        info: PkgInfo,
        node_id: &str,
        labels: &[(&str, &str)],
    ) {
        if self.graph.index.contains_key(node_id) {
            return;
        }
        self.graph.index.insert(node_id.to_owned(), self.graph.nodes.len());
        self.graph.nodes.push(GraphNode {
            node_id: node_id.to_owned(),
            info,
            deps: Vec::new(),
            labels: labels
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        });
    }

    /// 부모 -> 자식 간선을 연결합니다.
    ///
    /// 동일 간선은 한 번만 기록되며, 존재하지 않는 노드를 가리키는
    /// 연결은 무시됩니다.
    pub fn connect_dep(&mut self, parent_id: &str, child_id: &str) {
        if !self.graph.index.contains_key(child_id) {
            return;
        }
        let Some(&parent_idx) = self.graph.index.get(parent_id) else {
            return;
        };
        let deps = &mut self.graph.nodes[parent_idx].deps;
        if !deps.iter().any(|d| d == child_id) {
            deps.push(child_id.to_owned());
        }
    }

    /// 완성된 그래프를 반환합니다.
    pub fn build(self) -> DepGraph {
        self.graph
    }
}

/// listing 협력자를 호출하여 의존성 그래프를 구성합니다.
///
/// 협력자 실패가 main module 부재를 나타내면 루트만 있는 빈 그래프를
/// 반환하고, 그 외의 실패는 전체 명령 문자열을 담아
/// [`ScannerError::GoListFailed`]로 감싸 전파합니다. 출력이
/// `matched no packages`를 포함하는 경우도 빈 그래프입니다.
pub fn build_dep_graph_from_imports_and_modules(
    root: &Path,
    target_file: &str,
    toolchain: &dyn GoToolchain,
    options: &GraphOptions,
) -> Result<DepGraph, ScannerError> {
    let mut args = vec!["list".to_owned()];
    args.extend(options.additional_args.iter().cloned());
    args.extend(["-json", "-deps", "./..."].map(str::to_owned));

    let cwd = match Path::new(target_file).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => root.join(dir),
        _ => root.to_path_buf(),
    };

    let output = match toolchain.list_packages(&cwd, &args) {
        Ok(output) => output,
        Err(err) if golist::indicates_missing_main_module(&err.message) => {
            return build_dep_graph_from_packages(root, &[], options);
        }
        Err(err) => {
            return Err(ScannerError::GoListFailed {
                command: format!("go {}", args.join(" ")),
                reason: err.message,
            });
        }
    };

    if golist::matched_no_packages(&output) {
        return build_dep_graph_from_packages(root, &[], options);
    }

    let packages = golist::parse_package_stream(&output)?;
    build_dep_graph_from_packages(root, &packages, options)
}

/// 디코딩된 패키지 목록으로 의존성 그래프를 구성합니다.
///
/// 루트 패키지는 main 모듈 플래그가 있는 패키지의 모듈 경로를
/// 사용하고, 없으면 프로젝트 디렉토리 이름으로 대체합니다.
/// 루트 버전은 항상 `0.0.0`입니다.
pub fn build_dep_graph_from_packages(
    root: &Path,
    packages: &[GoPackage],
    options: &GraphOptions,
) -> Result<DepGraph, ScannerError> {
    let project_name = root
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(".")
        .to_owned();
    let project_version = "0.0.0";

    let local_packages: Vec<&GoPackage> = packages.iter().filter(|p| !p.dep_only).collect();

    let root_name = local_packages
        .iter()
        .find_map(|p| {
            p.module
                .as_ref()
                .filter(|m| m.main && !m.path.is_empty())
                .map(|m| m.path.clone())
        })
        .unwrap_or(project_name);

    let root_pkg = PkgInfo {
        name: root_name.clone(),
        version: project_version.to_owned(),
        purl: if options.include_package_urls {
            Some(create_go_purl(&root_name, Some(project_version), None)?)
        } else {
            None
        },
    };
    let mut builder = DepGraphBuilder::new(PackageManager::GoModules, root_pkg);

    let packages_by_name: HashMap<&str, &GoPackage> = packages
        .iter()
        .map(|p| (p.import_path.as_str(), p))
        .collect();

    // 루트(로컬) 패키지들이 참조하는 import의 합집합, 첫 등장 순서 유지
    let mut top_level_deps: Vec<String> = Vec::new();
    let mut seen = HashSet::new();
    for pkg in &local_packages {
        for import in &pkg.imports {
            if seen.insert(import.as_str()) {
                top_level_deps.push(import.clone());
            }
        }
    }

    let mut children_chain = HashMap::new();
    let mut ancestors_chain = HashMap::new();

    build_graph(
        &mut builder,
        &top_level_deps,
        &packages_by_name,
        ROOT_NODE_ID,
        &mut children_chain,
        &mut ancestors_chain,
        options,
        None,
    )?;

    Ok(builder.build())
}

/// 현재 frontier의 import들을 역순으로 순회하며 그래프를 확장합니다.
///
/// `children_chain`/`ancestors_chain`은 순환 차단용이고, `visited`는
/// 재귀 가지별 중복 전개 방지용입니다. 최상위 호출(`visited` 없음)은
/// frontier 항목마다 새 방문 집합을 시작합니다.
#[allow(clippy::too_many_arguments)]
pub(crate) fn build_graph(
    builder: &mut DepGraphBuilder,
    dep_packages: &[String],
    packages_by_name: &HashMap<&str, &GoPackage>,
    current_parent: &str,
    children_chain: &mut HashMap<String, Vec<String>>,
    ancestors_chain: &mut HashMap<String, Vec<String>>,
    options: &GraphOptions,
    mut visited: Option<&mut HashSet<String>>,
) -> Result<(), ScannerError> {
    for package_import in dep_packages.iter().rev() {
        let mut scratch = HashSet::new();
        let local_visited: &mut HashSet<String> = match visited.as_deref_mut() {
            Some(v) => v,
            None => &mut scratch,
        };

        let pkg_meta = packages_by_name.get(package_import.as_str()).copied();

        // ---------- 표준 라이브러리 처리 ----------
        if pkg_meta.is_some_and(|p| p.standard) {
            if !options.include_go_standard_library_deps {
                continue;
            }

            let std_name = format!("std/{package_import}");
            let purl = if options.include_package_urls {
                Some(create_go_purl(&std_name, Some(&options.stdlib_version), None)?)
            } else {
                None
            };
            let std_node = PkgInfo {
                name: std_name.clone(),
                version: options.stdlib_version.clone(),
                purl,
            };
            // leaf로만 합성하고 재귀하지 않음
            builder.add_pkg_node(std_node, &std_name);
            builder.connect_dep(current_parent, &std_name);
            continue;
        }

        // ---------- 외부 패키지 처리 ----------
        // 목록에 없거나 DepOnly가 아닌 import는 로컬/루트 패키지이므로
        // 외부 의존성 간선이 아님
        let Some(pkg) = pkg_meta.filter(|p| p.dep_only) else {
            continue;
        };

        let module = pkg.module.as_ref().map(|m| m.effective());
        let version = match module.and_then(|m| m.version.as_deref()).filter(|v| !v.is_empty()) {
            Some(raw) => to_canonical_version(&parse_version(raw))?,
            None => UNKNOWN_VERSION.to_owned(),
        };

        let current_children = children_chain
            .get(current_parent)
            .cloned()
            .unwrap_or_default();
        let current_ancestors = ancestors_chain
            .get(current_parent)
            .cloned()
            .unwrap_or_default();
        let is_ancestor_or_child = current_children.contains(package_import)
            || current_ancestors.contains(package_import);

        // 순환 차단: 출력 그래프 형식이 순환을 표현하지 못하므로
        // 조상/기존 자식으로 되돌아가는 간선은 버림
        if package_import == current_parent || is_ancestor_or_child {
            continue;
        }

        let purl = match (options.include_package_urls, module) {
            (true, Some(m)) => Some(create_go_purl(
                &m.path,
                m.version.as_deref().filter(|v| !v.is_empty()),
                Some(package_import.as_str()),
            )?),
            _ => None,
        };
        let new_node = PkgInfo {
            name: package_import.clone(),
            version,
            purl,
        };

        if local_visited.contains(package_import) {
            // 이미 이 가지에서 전개된 패키지: 간선의 존재만 기록
            let pruned_id = format!("{package_import}:pruned");
            builder.add_pkg_node_with_labels(new_node, &pruned_id, &[("pruned", "true")]);
            builder.connect_dep(current_parent, &pruned_id);
            continue;
        }

        builder.add_pkg_node(new_node, package_import);
        builder.connect_dep(current_parent, package_import);
        local_visited.insert(package_import.clone());

        children_chain
            .entry(current_parent.to_owned())
            .or_default()
            .push(package_import.clone());
        let mut ancestors = current_ancestors;
        ancestors.push(current_parent.to_owned());
        ancestors_chain.insert(package_import.clone(), ancestors);

        if !pkg.imports.is_empty() {
            build_graph(
                builder,
                &pkg.imports,
                packages_by_name,
                package_import,
                children_chain,
                ancestors_chain,
                options,
                Some(local_visited),
            )?;
        }
    }

    Ok(())
}

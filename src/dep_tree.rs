//! 의존성 트리 빌더 -- legacy graph 모드
//!
//! 외부 resolver가 만든 import 그래프(호출 전에 비순환이 보장됨)를
//! 프로젝트를 루트로 하는 중첩 트리로 낮춥니다.
//!
//! # 구성 규칙
//!
//! - 프로젝트 서브패키지(프로젝트 루트 아래, `vendor` 경계를 넘지 않는
//!   디렉토리)는 트리 노드로 남기지 않고 그 자식들을 가장 가까운
//!   비-서브패키지 조상으로 이동합니다.
//! - 외부 패키지의 버전은 고정 버전 테이블에서 찾고, 없으면 빈
//!   문자열입니다 (에러가 아님).
//! - 패키지별 등장 횟수를 경로와 형제 가지에 걸쳐 합산하여, 10회
//!   등장한 패키지의 이후 가지는 전개하지 않습니다. 깊거나 반복되는
//!   경로의 완전성을 희생하여 병적인 실세계 그래프에서 출력 크기를
//!   제한합니다.

use std::collections::{BTreeMap, HashMap};
use std::path::{MAIN_SEPARATOR, Path};

use serde::{Deserialize, Serialize};

use crate::error::ScannerError;
use crate::import_graph::{ImportGraph, PkgNode};
use crate::types::LockedDep;

/// 가상 루트 노드 식별자 -- 실제 패키지 이름과 겹치지 않는 상수
pub const VIRTUAL_ROOT_NODE_ID: &str = ".";

/// 트리 루트에 찍는 패키지 형식 태그
const PACKAGE_FORMAT_VERSION: &str = "golang:0.0.1";

/// 같은 패키지를 전개하는 최대 등장 횟수
const OCCURRENCE_LIMIT: u32 = 10;

/// 의존성 트리
///
/// 어떤 노드도 자기 자신을 자손으로 갖지 않습니다 (입력 그래프의
/// 비순환성이 사전 검증됨). 자식 맵은 이름 순으로 정렬되어
/// 직렬화가 결정적입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepTree {
    /// 패키지 이름 (루트는 전체 import 경로)
    pub name: String,
    /// 고정 버전 (루트/서브패키지 및 미확인 버전은 빈 문자열)
    #[serde(default)]
    pub version: String,
    /// 자식 이름 -> 서브트리
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, DepTree>,
    /// 루트에만 찍히는 패키지 형식 태그
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_format_version: Option<String>,
}

/// 재귀 한 단계의 결과 (내부 전용)
///
/// 등장 횟수 누적기와 서브패키지 여부는 출력 타입에 남지 않습니다.
struct BuiltSubtree {
    tree: DepTree,
    counts: HashMap<String, u32>,
    is_proj_subpkg: bool,
}

/// resolver 그래프를 의존성 트리로 낮춥니다.
///
/// 그래프에 순환이 있으면 [`ScannerError::ImportCycle`]로, 가상 루트
/// 노드가 없으면 [`ScannerError::DepGraphParse`]로 즉시 실패합니다.
/// 로컬 의존자가 없는 소스 노드들은 가상 루트의 자식으로 연결된 뒤
/// 낮춰집니다.
pub fn build_dep_tree(
    graph: &mut ImportGraph,
    locked_versions: &HashMap<String, LockedDep>,
    project_root: &Path,
) -> Result<DepTree, ScannerError> {
    if !graph.is_acyclic() {
        return Err(ScannerError::ImportCycle);
    }

    let root_node = graph
        .node(VIRTUAL_ROOT_NODE_ID)
        .cloned()
        .ok_or_else(|| ScannerError::DepGraphParse {
            reason: "virtual root node not found".to_owned(),
        })?;

    // 프로젝트에는 로컬 의존자가 없는 "진입점"이 여럿일 수 있으므로
    // 가상 루트에서 각 소스 노드로 간선을 추가해 트리를 만듦
    let sources: Vec<String> = graph
        .sources()
        .into_iter()
        .filter(|s| *s != VIRTUAL_ROOT_NODE_ID)
        .map(str::to_owned)
        .collect();
    for source in &sources {
        graph.add_edge(VIRTUAL_ROOT_NODE_ID, source);
    }

    let project_root = project_root.to_string_lossy();
    let built = build_pkg_tree(
        graph,
        &root_node,
        locked_versions,
        &project_root,
        &HashMap::new(),
    );

    let mut tree = built.tree;
    tree.package_format_version = Some(PACKAGE_FORMAT_VERSION.to_owned());
    Ok(tree)
}

/// 한 노드와 그 자손을 재귀적으로 낮춥니다.
///
/// `path_counts`는 루트에서 이 노드까지 오는 동안(먼저 처리된 형제
/// 가지 포함) 누적된 등장 횟수입니다. 이 단계에서 새로 붙인 자식과
/// 자식 서브트리의 횟수는 `counts`로 반환되어 상위에서 병합됩니다.
fn build_pkg_tree(
    graph: &ImportGraph,
    node: &PkgNode,
    locked_versions: &HashMap<String, LockedDep>,
    project_root: &str,
    path_counts: &HashMap<String, u32>,
) -> BuiltSubtree {
    let is_root = node.name == VIRTUAL_ROOT_NODE_ID;
    let is_proj_subpkg = is_proj_subpackage(&node.dir, project_root);

    let name = if is_root {
        node.full_import_path.clone()
    } else {
        node.name.clone()
    };

    let version = if is_root || is_proj_subpkg {
        String::new()
    } else {
        // 고정 버전이 없으면 빈 버전으로 두고 계속 진행
        locked_versions
            .get(&name)
            .map(|dep| dep.version.clone())
            .unwrap_or_default()
    };

    let mut dependencies: BTreeMap<String, DepTree> = BTreeMap::new();
    let mut local_counts: HashMap<String, u32> = HashMap::new();

    let mut children: Vec<&str> = graph
        .successors(&node.name)
        .iter()
        .map(String::as_str)
        .collect();
    children.sort_unstable();

    for dep_name in children {
        // 전체 순회에서 이미 10회 등장한 패키지의 가지는 버림:
        // 일부 경로를 잃는 대신 결과 크기의 폭발을 막음
        let occurrences = path_counts.get(dep_name).copied().unwrap_or(0)
            + local_counts.get(dep_name).copied().unwrap_or(0);
        if occurrences >= OCCURRENCE_LIMIT {
            continue;
        }

        let Some(dep_node) = graph.node(dep_name) else {
            continue;
        };

        let merged = sum_counts(path_counts, &local_counts);
        let child = build_pkg_tree(graph, dep_node, locked_versions, project_root, &merged);
        local_counts = sum_counts(&local_counts, &child.counts);

        if child.is_proj_subpkg {
            for (grandchild_name, grandchild) in child.tree.dependencies {
                // 이미 자식으로 있는 이름은 유지: 기존 항목이 더 낮은
                // 횟수로 순회되어 더 완전할 수 있음
                dependencies.entry(grandchild_name).or_insert(grandchild);
            }
            // 서브패키지는 결과에 남지 않지만 폭발 방지를 위해
            // 한 번으로 계수함
            *local_counts.entry(child.tree.name).or_insert(0) += 1;
        } else if !dependencies.contains_key(&child.tree.name) {
            // 손자 경유로 이미 추가된 경우는 건너뜀
            *local_counts.entry(child.tree.name.clone()).or_insert(0) += 1;
            dependencies.insert(child.tree.name.clone(), child.tree);
        }
    }

    BuiltSubtree {
        tree: DepTree {
            name,
            version,
            dependencies,
            package_format_version: None,
        },
        counts: local_counts,
        is_proj_subpkg: !is_root && is_proj_subpkg,
    }
}

/// 두 등장 횟수 맵을 합산합니다.
fn sum_counts(a: &HashMap<String, u32>, b: &HashMap<String, u32>) -> HashMap<String, u32> {
    let mut sum = a.clone();
    for (key, count) in b {
        *sum.entry(key.clone()).or_insert(0) += count;
    }
    sum
}

/// 디렉토리가 프로젝트 서브패키지인지 판별합니다.
///
/// 프로젝트 루트 자신이거나 그 아래 디렉토리면 서브패키지입니다.
/// 단, 상대 경로에 `vendor` 컴포넌트가 끼어 있으면 vendored 외부
/// 패키지이므로 서브패키지가 아닙니다.
fn is_proj_subpackage(pkg_dir: &str, project_root: &str) -> bool {
    if pkg_dir == project_root {
        return true;
    }

    let root = if project_root.ends_with(MAIN_SEPARATOR) {
        project_root.to_owned()
    } else {
        format!("{project_root}{MAIN_SEPARATOR}")
    };

    let Some(relative) = pkg_dir.strip_prefix(&root) else {
        return false;
    };

    !relative.split(MAIN_SEPARATOR).any(|part| part == "vendor")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT_ROOT: &str = "/project";

    fn root_node() -> PkgNode {
        PkgNode {
            name: VIRTUAL_ROOT_NODE_ID.to_owned(),
            dir: PROJECT_ROOT.to_owned(),
            full_import_path: "github.com/example/app".to_owned(),
        }
    }

    fn external(name: &str) -> PkgNode {
        PkgNode {
            name: name.to_owned(),
            dir: format!("/gopath/src/{name}"),
            full_import_path: String::new(),
        }
    }

    fn subpackage(name: &str) -> PkgNode {
        PkgNode {
            name: name.to_owned(),
            dir: format!("{PROJECT_ROOT}/{}", name.rsplit('/').next().unwrap()),
            full_import_path: String::new(),
        }
    }

    fn locked(entries: &[(&str, &str)]) -> HashMap<String, LockedDep> {
        entries
            .iter()
            .map(|(name, version)| {
                (
                    (*name).to_owned(),
                    LockedDep {
                        name: (*name).to_owned(),
                        version: (*version).to_owned(),
                    },
                )
            })
            .collect()
    }

    fn build(graph: &mut ImportGraph, locked_versions: &HashMap<String, LockedDep>) -> DepTree {
        build_dep_tree(graph, locked_versions, Path::new(PROJECT_ROOT)).unwrap()
    }

    #[test]
    fn root_takes_full_import_path_and_format_tag() {
        let mut graph = ImportGraph::new();
        graph.add_node(VIRTUAL_ROOT_NODE_ID, root_node());
        let tree = build(&mut graph, &HashMap::new());
        assert_eq!(tree.name, "github.com/example/app");
        assert_eq!(tree.version, "");
        assert_eq!(tree.package_format_version.as_deref(), Some("golang:0.0.1"));
        assert!(tree.dependencies.is_empty());
    }

    #[test]
    fn missing_virtual_root_is_an_error() {
        let mut graph = ImportGraph::new();
        graph.add_node("a", external("a"));
        let result = build_dep_tree(&mut graph, &HashMap::new(), Path::new(PROJECT_ROOT));
        assert!(matches!(result, Err(ScannerError::DepGraphParse { .. })));
    }

    #[test]
    fn cyclic_graph_is_an_error() {
        let mut graph = ImportGraph::new();
        graph.add_node(VIRTUAL_ROOT_NODE_ID, root_node());
        graph.add_node("a", external("a"));
        graph.add_node("b", external("b"));
        graph.add_edge("a", "b");
        graph.add_edge("b", "a");
        let result = build_dep_tree(&mut graph, &HashMap::new(), Path::new(PROJECT_ROOT));
        assert!(matches!(result, Err(ScannerError::ImportCycle)));
    }

    #[test]
    fn externals_take_locked_versions() {
        let mut graph = ImportGraph::new();
        graph.add_node(VIRTUAL_ROOT_NODE_ID, root_node());
        graph.add_node("github.com/foo/bar", external("github.com/foo/bar"));
        graph.add_node("github.com/no/lock", external("github.com/no/lock"));
        graph.add_edge(VIRTUAL_ROOT_NODE_ID, "github.com/foo/bar");
        graph.add_edge(VIRTUAL_ROOT_NODE_ID, "github.com/no/lock");

        let locked_versions = locked(&[("github.com/foo/bar", "v1.0.3")]);
        let tree = build(&mut graph, &locked_versions);

        assert_eq!(tree.dependencies["github.com/foo/bar"].version, "v1.0.3");
        // 고정 버전이 없으면 빈 버전 (soft 조건)
        assert_eq!(tree.dependencies["github.com/no/lock"].version, "");
    }

    #[test]
    fn sources_are_wired_under_the_virtual_root() {
        // 로컬 의존자가 없는 진입점 두 개가 루트 자식이 됨
        let mut graph = ImportGraph::new();
        graph.add_node(VIRTUAL_ROOT_NODE_ID, root_node());
        graph.add_node("github.com/entry/one", external("github.com/entry/one"));
        graph.add_node("github.com/entry/two", external("github.com/entry/two"));
        graph.add_node("github.com/shared/dep", external("github.com/shared/dep"));
        graph.add_edge("github.com/entry/one", "github.com/shared/dep");
        graph.add_edge("github.com/entry/two", "github.com/shared/dep");

        let tree = build(&mut graph, &HashMap::new());
        assert!(tree.dependencies.contains_key("github.com/entry/one"));
        assert!(tree.dependencies.contains_key("github.com/entry/two"));
    }

    #[test]
    fn subpackage_children_are_spliced_into_the_parent() {
        let mut graph = ImportGraph::new();
        graph.add_node(VIRTUAL_ROOT_NODE_ID, root_node());
        graph.add_node("app/internal", subpackage("app/internal"));
        graph.add_node("github.com/foo/bar", external("github.com/foo/bar"));
        graph.add_edge(VIRTUAL_ROOT_NODE_ID, "app/internal");
        graph.add_edge("app/internal", "github.com/foo/bar");

        let locked_versions = locked(&[("github.com/foo/bar", "v2.0.0")]);
        let tree = build(&mut graph, &locked_versions);

        // 서브패키지는 트리에 남지 않고 그 자식이 루트로 이동
        assert!(!tree.dependencies.contains_key("app/internal"));
        assert_eq!(tree.dependencies["github.com/foo/bar"].version, "v2.0.0");
    }

    #[test]
    fn spliced_grandchild_does_not_replace_existing_child() {
        let mut graph = ImportGraph::new();
        graph.add_node(VIRTUAL_ROOT_NODE_ID, root_node());
        graph.add_node("app/util", subpackage("app/util"));
        graph.add_node("github.com/foo/bar", external("github.com/foo/bar"));
        graph.add_node("github.com/other/dep", external("github.com/other/dep"));
        // 루트가 직접 foo/bar를 갖고, 서브패키지도 foo/bar를 가짐
        graph.add_edge(VIRTUAL_ROOT_NODE_ID, "github.com/foo/bar");
        graph.add_edge(VIRTUAL_ROOT_NODE_ID, "app/util");
        graph.add_edge("app/util", "github.com/foo/bar");
        graph.add_edge("github.com/foo/bar", "github.com/other/dep");

        let tree = build(&mut graph, &HashMap::new());
        // 먼저 붙은 자식이 유지되고 서브패키지 경유 항목은 무시됨
        assert!(tree.dependencies["github.com/foo/bar"]
            .dependencies
            .contains_key("github.com/other/dep"));
    }

    #[test]
    fn vendored_package_is_not_a_subpackage() {
        let mut graph = ImportGraph::new();
        graph.add_node(VIRTUAL_ROOT_NODE_ID, root_node());
        let mut vendored = external("github.com/foo/bar");
        vendored.dir = format!("{PROJECT_ROOT}/vendor/github.com/foo/bar");
        graph.add_node("github.com/foo/bar", vendored);
        graph.add_edge(VIRTUAL_ROOT_NODE_ID, "github.com/foo/bar");

        let locked_versions = locked(&[("github.com/foo/bar", "v1.0.0")]);
        let tree = build(&mut graph, &locked_versions);
        // vendored 패키지는 외부 의존성으로 남아 버전을 가짐
        assert_eq!(tree.dependencies["github.com/foo/bar"].version, "v1.0.0");
    }

    #[test]
    fn occurrence_guard_prunes_after_ten_attachments() {
        let mut graph = ImportGraph::new();
        graph.add_node(VIRTUAL_ROOT_NODE_ID, root_node());
        graph.add_node("github.com/hot/util", external("github.com/hot/util"));
        // 11개의 형제 경로가 같은 패키지를 가리킴
        for i in 1..=11 {
            let name = format!("github.com/entry/e{i:02}");
            graph.add_node(&name, external(&name));
            graph.add_edge(VIRTUAL_ROOT_NODE_ID, &name);
            graph.add_edge(&name, "github.com/hot/util");
        }

        let tree = build(&mut graph, &HashMap::new());

        let with_util: Vec<&str> = tree
            .dependencies
            .values()
            .filter(|child| child.dependencies.contains_key("github.com/hot/util"))
            .map(|child| child.name.as_str())
            .collect();
        // 처음 10회는 붙고 11번째부터는 가지가 전개되지 않음
        assert_eq!(with_util.len(), 10);
        assert!(!with_util.contains(&"github.com/entry/e11"));
    }

    #[test]
    fn children_are_sorted_lexicographically() {
        let mut graph = ImportGraph::new();
        graph.add_node(VIRTUAL_ROOT_NODE_ID, root_node());
        for name in ["github.com/zed/z", "github.com/abc/a", "github.com/mid/m"] {
            graph.add_node(name, external(name));
            graph.add_edge(VIRTUAL_ROOT_NODE_ID, name);
        }
        let tree = build(&mut graph, &HashMap::new());
        let names: Vec<&String> = tree.dependencies.keys().collect();
        assert_eq!(
            names,
            ["github.com/abc/a", "github.com/mid/m", "github.com/zed/z"],
        );
    }

    #[test]
    fn construction_is_deterministic() {
        let build_once = || {
            let mut graph = ImportGraph::new();
            graph.add_node(VIRTUAL_ROOT_NODE_ID, root_node());
            graph.add_node("app/sub", subpackage("app/sub"));
            graph.add_node("github.com/a/a", external("github.com/a/a"));
            graph.add_node("github.com/b/b", external("github.com/b/b"));
            graph.add_edge(VIRTUAL_ROOT_NODE_ID, "app/sub");
            graph.add_edge("app/sub", "github.com/a/a");
            graph.add_edge("github.com/a/a", "github.com/b/b");
            let locked_versions =
                locked(&[("github.com/a/a", "v1.1.1"), ("github.com/b/b", "#abc123")]);
            serde_json::to_string(&build(&mut graph, &locked_versions)).unwrap()
        };
        assert_eq!(build_once(), build_once());
    }

    #[test]
    fn serializes_with_camel_case_format_tag() {
        let mut graph = ImportGraph::new();
        graph.add_node(VIRTUAL_ROOT_NODE_ID, root_node());
        let tree = build(&mut graph, &HashMap::new());
        let json = serde_json::to_string(&tree).unwrap();
        assert!(json.contains("\"packageFormatVersion\":\"golang:0.0.1\""));
        assert!(!json.contains("_counts"));
    }

    #[test]
    fn subpackage_detection_rules() {
        assert!(is_proj_subpackage("/project", "/project"));
        assert!(is_proj_subpackage("/project/internal/util", "/project"));
        assert!(!is_proj_subpackage("/gopath/src/github.com/foo", "/project"));
        assert!(!is_proj_subpackage("/project/vendor/github.com/foo", "/project"));
        // 접두사가 유사해도 경로 경계 밖이면 아님
        assert!(!is_proj_subpackage("/project2/pkg", "/project"));
        // 루트에 이미 구분자가 붙어 있어도 동작
        assert!(is_proj_subpackage("/project/pkg", "/project/"));
    }
}

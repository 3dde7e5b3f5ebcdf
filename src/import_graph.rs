//! Resolver import 그래프 -- 소유된 인접 리스트 표현
//!
//! legacy resolver가 출력하는 graphlib 형식 JSON
//! (`{"nodes": [{"v", "value"}], "edges": [{"v", "w"}]}`)을 디코딩하여
//! 패키지 이름을 키로 하는 방향 그래프를 만듭니다. 트리 빌더가 필요로
//! 하는 연산(노드/후속자 조회, 소스 노드 열거)과 O(V+E) 순환 검사만
//! 제공합니다.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::ScannerError;

/// 그래프 노드 값 -- resolver가 패키지마다 기록하는 메타데이터
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct PkgNode {
    /// 패키지 이름 (그래프 키와 동일)
    pub name: String,
    /// 패키지 소스 디렉토리
    pub dir: String,
    /// 루트 노드에만 채워지는 전체 import 경로
    pub full_import_path: String,
}

/// graphlib JSON 문서 (파싱용)
#[derive(Deserialize)]
struct GraphDoc {
    #[serde(default)]
    nodes: Vec<GraphNodeEntry>,
    #[serde(default)]
    edges: Vec<GraphEdgeEntry>,
}

#[derive(Deserialize)]
struct GraphNodeEntry {
    v: String,
    #[serde(default)]
    value: Option<PkgNode>,
}

#[derive(Deserialize)]
struct GraphEdgeEntry {
    v: String,
    w: String,
}

/// 패키지 이름을 키로 하는 방향 그래프
///
/// 노드와 간선은 삽입 시 중복이 제거됩니다. 노드 열거는 이름 순으로
/// 결정적입니다.
#[derive(Debug, Clone, Default)]
pub struct ImportGraph {
    nodes: BTreeMap<String, PkgNode>,
    successors: BTreeMap<String, Vec<String>>,
}

impl ImportGraph {
    /// 빈 그래프를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// resolver의 graphlib JSON 출력을 디코딩합니다.
    ///
    /// 값이 없는 노드는 이름만 채운 기본값으로 수용합니다.
    pub fn from_graphlib_json(content: &str) -> Result<Self, ScannerError> {
        let doc: GraphDoc =
            serde_json::from_str(content).map_err(|e| ScannerError::DepGraphParse {
                reason: format!("resolver graph is not valid JSON: {e}"),
            })?;

        let mut graph = Self::new();
        for entry in doc.nodes {
            let value = entry.value.unwrap_or_else(|| PkgNode {
                name: entry.v.clone(),
                ..PkgNode::default()
            });
            graph.add_node(entry.v, value);
        }
        for edge in doc.edges {
            graph.add_edge(&edge.v, &edge.w);
        }
        Ok(graph)
    }

    /// 노드를 추가합니다. 같은 키의 기존 노드는 대체됩니다.
    pub fn add_node(&mut self, key: impl Into<String>, value: PkgNode) {
        self.nodes.insert(key.into(), value);
    }

    /// 간선을 추가합니다. 동일 간선은 한 번만 기록됩니다.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        let succs = self.successors.entry(from.to_owned()).or_default();
        if !succs.iter().any(|s| s == to) {
            succs.push(to.to_owned());
        }
    }

    /// 키로 노드 값을 조회합니다.
    pub fn node(&self, key: &str) -> Option<&PkgNode> {
        self.nodes.get(key)
    }

    /// 노드 수를 반환합니다.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// 노드의 후속자(직접 의존성) 목록을 반환합니다.
    pub fn successors(&self, key: &str) -> &[String] {
        self.successors.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 들어오는 간선이 없는 노드들을 이름 순으로 반환합니다.
    pub fn sources(&self) -> Vec<&str> {
        let mut has_incoming: HashMap<&str, bool> = HashMap::new();
        for succs in self.successors.values() {
            for to in succs {
                has_incoming.insert(to, true);
            }
        }
        self.nodes
            .keys()
            .filter(|k| !has_incoming.contains_key(k.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// 그래프에 순환이 없는지 확인합니다.
    ///
    /// 3색 DFS를 반복문으로 수행하므로 깊은 그래프에서도 스택이
    /// 넘치지 않습니다. O(V+E).
    pub fn is_acyclic(&self) -> bool {
        #[derive(Clone, Copy, PartialEq)]
        enum Color {
            Gray,
            Black,
        }

        let mut color: HashMap<&str, Color> = HashMap::new();

        for start in self.nodes.keys() {
            if color.contains_key(start.as_str()) {
                continue;
            }
            let mut stack: Vec<(&str, usize)> = vec![(start.as_str(), 0)];
            color.insert(start.as_str(), Color::Gray);

            while let Some((node, next_idx)) = stack.last_mut() {
                let succs = self.successors(node);
                if *next_idx < succs.len() {
                    let succ = succs[*next_idx].as_str();
                    *next_idx += 1;
                    match color.get(succ) {
                        None => {
                            color.insert(succ, Color::Gray);
                            stack.push((succ, 0));
                        }
                        Some(Color::Gray) => return false, // back edge
                        Some(Color::Black) => {}
                    }
                } else {
                    color.insert(*node, Color::Black);
                    stack.pop();
                }
            }
        }

        true
    }
}

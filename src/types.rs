//! 도메인 타입 -- go list 레코드, 고정 버전 테이블, 플러그인 메타데이터
//!
//! `go list -json` 출력 레코드([`GoPackage`], [`GoModule`])와
//! legacy 패키지 관리자의 고정 버전 테이블([`GoProjectConfig`]),
//! 대상 파일로부터의 패키지 관리자 판별([`PackageManager`])을 정의합니다.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Go 패키지 관리 세대 (대상 manifest 파일로 판별)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackageManager {
    /// dep (Gopkg.lock / Gopkg.toml)
    GolangDep,
    /// govendor (vendor/vendor.json)
    Govendor,
    /// go modules (go.mod)
    GoModules,
}

impl PackageManager {
    /// 대상 파일의 basename으로 패키지 관리자를 판별합니다.
    ///
    /// 알려진 파일명은 `Gopkg.lock`, `vendor.json`, `go.mod`입니다.
    pub fn from_target_file(target_file: &Path) -> Option<Self> {
        let file_name = target_file.file_name().and_then(|n| n.to_str())?;
        match file_name {
            "Gopkg.lock" => Some(Self::GolangDep),
            "vendor.json" => Some(Self::Govendor),
            "go.mod" => Some(Self::GoModules),
            _ => None,
        }
    }

    /// vendor 디렉토리를 동기화하는 명령을 반환합니다.
    ///
    /// 미해결 패키지 에러의 안내 메시지에 사용됩니다.
    pub fn vendor_sync_cmd(&self) -> &'static str {
        match self {
            Self::GolangDep => "dep ensure",
            Self::Govendor => "govendor sync",
            Self::GoModules => "go mod download",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GolangDep => write!(f, "golangdep"),
            Self::Govendor => write!(f, "govendor"),
            Self::GoModules => write!(f, "gomodules"),
        }
    }
}

/// `go list -json` 패키지 레코드
///
/// <https://golang.org/cmd/go/#hdr-List_packages_or_modules> 의 필드 중
/// 그래프 구성에 필요한 부분만 유지합니다. 누락 필드는 기본값으로 채웁니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct GoPackage {
    /// import 경로 (목록 내 유일 키)
    pub import_path: String,
    /// 패키지 소스 디렉토리
    pub dir: String,
    /// 패키지 이름
    pub name: String,
    /// 표준 라이브러리 여부
    pub standard: bool,
    /// 직접 요청된 패키지가 아니라 의존성으로만 나열되었는지 여부
    pub dep_only: bool,
    /// 이 패키지가 import하는 경로 목록
    pub imports: Vec<String>,
    /// 패키지를 포함하는 모듈 정보 (GOPATH 모드에서는 없음)
    pub module: Option<GoModule>,
}

/// `go list -json` 모듈 레코드
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct GoModule {
    /// 모듈 경로
    pub path: String,
    /// 모듈 버전 (main 모듈에는 없음)
    pub version: Option<String>,
    /// replace 지시어로 대체된 모듈
    pub replace: Option<Box<GoModule>>,
    /// main 모듈 여부
    pub main: bool,
}

impl GoModule {
    /// 버전 귀속에 사용할 모듈을 반환합니다.
    ///
    /// replace 지시어가 있으면 그 대상을, 없으면 자신을 반환합니다.
    /// 간접 참조는 한 단계만 따라갑니다.
    pub fn effective(&self) -> &GoModule {
        self.replace.as_deref().unwrap_or(self)
    }
}

/// lock 파일에서 확인된 단일 패키지의 고정 버전
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedDep {
    /// 완전한 패키지 import 경로
    pub name: String,
    /// 고정 버전 문자열 (`1.2.3` 또는 `#<revision>`)
    pub version: String,
}

/// legacy manifest/lock에서 추출한 프로젝트 설정
///
/// 트리 모드 구성의 입력으로 사용됩니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoProjectConfig {
    /// import 경로 -> 고정 버전
    pub locked_versions: HashMap<String, LockedDep>,
    /// 스캔에서 제외할 패키지 패턴 (정확 경로 또는 `경로/*`)
    pub ignored_pkgs: Vec<String>,
}

/// 플러그인 메타데이터 -- 스캔 결과에 동봉되어 플랫폼으로 전달됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginMetadata {
    /// 플러그인 이름
    pub name: String,
    /// 감지된 Go 런타임 (예: `go1.22.2`, 감지 실패 시 None)
    pub runtime: Option<String>,
    /// 스캔 대상 파일 (POSIX 구분자)
    pub target_file: String,
}

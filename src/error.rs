//! 스캐너 에러 타입
//!
//! [`ScannerError`]는 플러그인 내에서 발생할 수 있는 모든 에러를 나타냅니다.
//! 표시 문자열은 취약점 분석 플랫폼이 사용자에게 그대로 노출하는 메시지이므로
//! 형식을 변경하면 안 됩니다.
//!
//! # 에러 카테고리
//!
//! - **Manifest/lock 파싱**: `ManifestParse`
//! - **Toolchain 호출 실패**: `GoListFailed`, `UnresolvedPackages`
//! - **구조 위반**: `ImportCycle`, `DepGraphParse`
//! - **버전 형식**: `UnexpectedVersionFormat`, `InvalidModuleVersion`
//! - **설정/입력**: `Config`, `UnsupportedTargetFile`
//! - **파일 I/O**: `Io`

/// 의존성 스캐너 도메인 에러
///
/// 파싱/구조 에러는 재시도 없이 호출자에게 그대로 전파됩니다.
/// 고정 버전 누락, 빈 프로젝트 등의 회복 가능한 조건은 에러가 아니라
/// 출력의 형태(빈 필드, 빈 그래프)로 흡수됩니다.
#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    /// Manifest 또는 lock 파일 파싱 실패
    #[error("failed parsing {path}: {reason}")]
    ManifestParse {
        /// 파싱 대상 파일 경로
        path: String,
        /// 파싱 실패 사유
        reason: String,
    },

    /// `go list` 호출 실패 (main module 부재 이외의 원인)
    #[error("'{command}' command failed with error: {reason}")]
    GoListFailed {
        /// 전체 명령 문자열 (예: `go list -json -deps ./...`)
        command: String,
        /// toolchain이 보고한 에러 텍스트
        reason: String,
    },

    /// Resolver 그래프에 순환이 존재
    ///
    /// Go 컴파일러는 import 순환을 허용하지 않으므로, 순환은 resolver의
    /// 오동작을 의미합니다.
    #[error("import cycle detected (not allowed by the Go compiler)")]
    ImportCycle,

    /// Resolver 그래프 JSON이 손상되었거나 가상 루트가 없음
    #[error("failed parsing dependency graph: {reason}")]
    DepGraphParse {
        /// 실패 사유
        reason: String,
    },

    /// Resolver 실행 실패 (미해결 패키지 이외의 원인)
    #[error("dependency resolution failed: {reason}")]
    ResolveFailed {
        /// resolver가 보고한 에러 텍스트
        reason: String,
    },

    /// Resolver가 미해결 패키지를 보고함
    ///
    /// vendor 디렉토리 동기화 명령을 안내 메시지로 덧붙입니다.
    #[error("{details}\nUnresolved imports found, please run `{sync_cmd}`")]
    UnresolvedPackages {
        /// resolver 출력에서 `Unresolved packages:` 이후 부분
        details: String,
        /// 패키지 관리자별 동기화 명령
        sync_cmd: String,
    },

    /// 버전이 exact도 pseudo도 아닌 형태
    ///
    /// 파서가 전체 입력을 수용하므로 정상 경로에서는 도달하지 않아야 하며,
    /// 인코더의 방어적 검사로만 발생합니다.
    #[error("Unexpected module version format")]
    UnexpectedVersionFormat,

    /// `go mod graph` 출력의 `module@version` 토큰이 손상됨
    #[error("invalid module@version: {value}")]
    InvalidModuleVersion {
        /// 문제의 토큰
        value: String,
    },

    /// 지원하지 않는 manifest 파일
    #[error("unsupported file: {path}")]
    UnsupportedTargetFile {
        /// 전달된 대상 파일
        path: String,
    },

    /// 스캔 옵션 검증 실패
    #[error("config error: {field}: {reason}")]
    Config {
        /// 옵션 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 파일 I/O 에러
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },
}

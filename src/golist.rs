//! `go list` 출력 디코딩 -- 패키지 스트림과 버전 추출
//!
//! `go list -json -deps ./...`는 JSON 배열이 아니라 JSON 오브젝트를
//! 연달아 출력합니다. 이 모듈은 그 스트림을 [`GoPackage`] 목록으로
//! 디코딩하고, 출력/에러 텍스트에서 특수 조건(패키지 없음, main module
//! 없음)과 Go 버전 문자열을 추출합니다. 순수 텍스트 처리만 수행합니다.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ScannerError;
use crate::types::GoPackage;

/// `go version` 출력의 버전 토큰 (`go1`, `go1.22`, `go1.22.2`, `go1.22rc1` 수용)
static GO_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(go\d+(?:\.\d+){0,2}[a-z0-9]*)").expect("go version regex"));

/// go.mod의 `toolchain goX.Y.Z` 지시어
static TOOLCHAIN_DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*toolchain\s+go(\d+\.\d+\.\d+)").expect("toolchain directive regex")
});

/// 연접 JSON 패키지 스트림을 디코딩합니다.
///
/// 빈 출력은 빈 목록을 반환합니다. JSON이 손상된 경우
/// [`ScannerError::DepGraphParse`]로 실패합니다.
pub fn parse_package_stream(output: &str) -> Result<Vec<GoPackage>, ScannerError> {
    let mut packages = Vec::new();
    for record in serde_json::Deserializer::from_str(output).into_iter::<GoPackage>() {
        let package = record.map_err(|e| ScannerError::DepGraphParse {
            reason: format!("go list output is not valid JSON: {e}"),
        })?;
        packages.push(package);
    }
    Ok(packages)
}

/// listing 출력이 "패키지 없음"을 나타내는지 확인합니다.
///
/// 이 조건은 에러가 아니라 빈 그래프로 귀결됩니다.
pub fn matched_no_packages(output: &str) -> bool {
    output.contains("matched no packages")
}

/// toolchain 에러 텍스트가 main module 부재를 나타내는지 확인합니다.
///
/// go.mod 없이 실행된 경우의 두 가지 메시지 형태를 모두 수용하며,
/// 이 조건 역시 빈 그래프로 귀결됩니다.
pub fn indicates_missing_main_module(error_text: &str) -> bool {
    error_text.contains("cannot find main module, but found")
        || error_text.contains("does not contain main module")
}

/// `go version` 출력에서 런타임 버전을 추출합니다 (`go` 접두사 유지).
///
/// 플러그인 메타데이터의 `runtime` 필드에 사용됩니다.
pub fn extract_runtime_version(output: &str) -> Option<String> {
    GO_VERSION_RE.captures(output).map(|caps| caps[1].to_owned())
}

/// `go version` 출력에서 표준 라이브러리 대체 버전을 추출합니다
/// (`go` 접두사 제거).
pub fn extract_stdlib_version(output: &str) -> Option<String> {
    GO_VERSION_RE
        .captures(output)
        .map(|caps| caps[1].trim_start_matches("go").to_owned())
}

/// go.mod 내용에서 `toolchain` 지시어의 버전을 추출합니다.
pub fn stdlib_version_from_gomod(content: &str) -> Option<String> {
    TOOLCHAIN_DIRECTIVE_RE
        .captures(content)
        .map(|caps| caps[1].to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_concatenated_json_objects() {
        let output = r#"{
    "ImportPath": "github.com/example/app",
    "Name": "main",
    "Imports": ["fmt", "rsc.io/quote"]
}
{
    "ImportPath": "rsc.io/quote",
    "Name": "quote",
    "DepOnly": true,
    "Module": {
        "Path": "rsc.io/quote",
        "Version": "v1.5.2"
    }
}
"#;
        let packages = parse_package_stream(output).unwrap();
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].import_path, "github.com/example/app");
        assert_eq!(packages[1].import_path, "rsc.io/quote");
        assert!(packages[1].dep_only);
    }

    #[test]
    fn empty_output_is_empty_listing() {
        assert!(parse_package_stream("").unwrap().is_empty());
        assert!(parse_package_stream("  \n").unwrap().is_empty());
    }

    #[test]
    fn malformed_output_is_an_error() {
        let result = parse_package_stream("{\"ImportPath\": ");
        assert!(matches!(result, Err(ScannerError::DepGraphParse { .. })));
    }

    #[test]
    fn detects_matched_no_packages() {
        assert!(matched_no_packages("go: warning: \"./...\" matched no packages\n"));
        assert!(!matched_no_packages("{\"ImportPath\": \"fmt\"}"));
    }

    #[test]
    fn detects_missing_main_module() {
        assert!(indicates_missing_main_module(
            "go: cannot find main module, but found .git/config in /project",
        ));
        assert!(indicates_missing_main_module(
            "go: go.mod file not found in current directory or any parent directory; \
             directory /project does not contain main module",
        ));
        assert!(!indicates_missing_main_module("exit status 1"));
    }

    #[test]
    fn extracts_runtime_version_with_prefix() {
        assert_eq!(
            extract_runtime_version("go version go1.22.2 linux/amd64").as_deref(),
            Some("go1.22.2"),
        );
        assert_eq!(extract_runtime_version("no version here"), None);
    }

    #[test]
    fn extracts_stdlib_version_without_prefix() {
        assert_eq!(
            extract_stdlib_version("go version go1.22.2 linux/amd64").as_deref(),
            Some("1.22.2"),
        );
        // prerelease 형태도 수용
        assert_eq!(
            extract_stdlib_version("go version go1.22rc1 darwin/arm64").as_deref(),
            Some("1.22rc1"),
        );
    }

    #[test]
    fn extracts_toolchain_directive_from_gomod() {
        let gomod = "module github.com/example/app\n\ngo 1.21\n\ntoolchain go1.22.3\n";
        assert_eq!(stdlib_version_from_gomod(gomod).as_deref(), Some("1.22.3"));
    }

    #[test]
    fn gomod_without_toolchain_directive() {
        let gomod = "module github.com/example/app\n\ngo 1.21\n";
        assert_eq!(stdlib_version_from_gomod(gomod), None);
    }
}

//! Package URL 인코더 -- golang 타입 purl 문자열 생성
//!
//! 모듈 경로/버전 쌍을 purl 명세의 golang 타입 식별자로 변환합니다.
//! <https://github.com/package-url/purl-spec> 의 golang 정의를 따르며,
//! 네트워크/파일시스템 접근이 없는 순수 문자열 변환입니다.

use crate::error::ScannerError;
use crate::version::{parse_version, to_canonical_version};

const PURL_TYPE_GOLANG: &str = "golang";

/// 모듈 경로와 버전으로 purl 문자열을 생성합니다.
///
/// 모듈 경로의 마지막 `/` 앞부분이 namespace, 마지막 조각이 name이
/// 됩니다. `/`가 없으면 경로 전체가 name이고 namespace는 없습니다.
///
/// `import_path`가 주어지고 모듈 경로와 다르면 서브패키지로 취급하여
/// 모듈 경로 접두사를 제거한 나머지를 subpath로 붙입니다.
///
/// 버전은 버전 코덱의 정규 형태로 렌더링됩니다
/// (`v1.0.0` -> `1.0.0`, pseudo-version -> `#<hash>`).
///
/// # 출력 형식
///
/// `pkg:golang/<namespace/>name@version[#subpath]`
pub fn create_go_purl(
    module_path: &str,
    version: Option<&str>,
    import_path: Option<&str>,
) -> Result<String, ScannerError> {
    let (namespace, name) = match module_path.rfind('/') {
        Some(idx) => (Some(&module_path[..idx]), &module_path[idx + 1..]),
        None => (None, module_path),
    };

    let subpath = import_path
        .filter(|p| *p != module_path)
        .map(|p| p.replacen(&format!("{module_path}/"), "", 1));

    let mut purl = format!("pkg:{PURL_TYPE_GOLANG}/");
    if let Some(namespace) = namespace {
        purl.push_str(namespace);
        purl.push('/');
    }
    purl.push_str(name);
    if let Some(version) = version {
        let canonical = to_canonical_version(&parse_version(version))?;
        purl.push('@');
        purl.push_str(&canonical);
    }
    if let Some(subpath) = subpath {
        purl.push('#');
        purl.push_str(&subpath);
    }
    Ok(purl)
}

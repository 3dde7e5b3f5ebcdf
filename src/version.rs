//! 모듈 버전 코덱 -- Go 모듈 버전 문자열의 파싱과 정규화
//!
//! go modules 생태계의 버전 인코딩(시맨틱 태그, pseudo-version,
//! `+incompatible` 접미사)을 태그된 유니온 [`ModuleVersion`]으로 파싱하고,
//! 플랫폼이 소비하는 정규 문자열 형태로 변환합니다.
//!
//! # 정규 형태
//!
//! - exact 버전은 선행 `v`를 제거하여 렌더링: `v1.2.3` -> `1.2.3`
//! - pseudo-version은 커밋 해시만 렌더링: `v0.0.0-20210101000000-abcdef012345` -> `#abcdef012345`

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ScannerError;

/// pseudo-version 패턴: `vMAJOR.MINOR.PATCH-[suffix.]TIMESTAMP14-HASH12`
///
/// 중간 그룹은 lazy이므로 prerelease 접미사(`pre.0.` 등)가 있어도
/// 타임스탬프/해시가 올바르게 분리됩니다.
static PSEUDO_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(v\d+\.\d+\.\d+)-(.*?)(\d{14})-([0-9a-f]{12})").expect("pseudo-version regex")
});

/// 파싱된 모듈 버전
///
/// 파서는 전체 입력을 수용합니다. pseudo-version 패턴에 맞지 않는 모든
/// 문자열은 exact로 취급됩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleVersion {
    /// 시맨틱 태그 버전 (선택적 `+incompatible` 마커 포함)
    Exact {
        /// 태그 문자열 (`v` 접두사 유지)
        version: String,
        /// `+incompatible` 접미사가 있었는지 여부
        incompatible: bool,
    },
    /// 태그 없는 커밋을 가리키는 pseudo-version
    Pseudo {
        /// 기반 태그 (`v0.0.0` 등)
        base: String,
        /// 기반 태그와 타임스탬프 사이의 prerelease 조각
        suffix: String,
        /// 14자리 커밋 타임스탬프
        timestamp: String,
        /// 12자리 커밋 해시 접두사
        hash: String,
    },
}

/// 버전 문자열을 파싱합니다.
///
/// pseudo-version 패턴에 매칭되면 [`ModuleVersion::Pseudo`]를,
/// 그 외에는 `+incompatible` 접미사를 분리한 [`ModuleVersion::Exact`]를
/// 반환합니다. 어떤 입력에도 실패하지 않습니다.
pub fn parse_version(raw: &str) -> ModuleVersion {
    if let Some(caps) = PSEUDO_VERSION_RE.captures(raw) {
        return ModuleVersion::Pseudo {
            base: caps[1].to_owned(),
            suffix: caps[2].to_owned(),
            timestamp: caps[3].to_owned(),
            hash: caps[4].to_owned(),
        };
    }

    let (version, incompatible) = match raw.strip_suffix("+incompatible") {
        Some(stripped) => (stripped, true),
        None => (raw, false),
    };
    ModuleVersion::Exact {
        version: version.to_owned(),
        incompatible,
    }
}

/// 파싱된 버전을 정규 문자열로 변환합니다.
///
/// pseudo-version은 `#<hash>`, exact 버전은 선행 `v`를 제거한 태그를
/// 반환합니다. 빈 exact 버전(빈 문자열 입력)은
/// [`ScannerError::UnexpectedVersionFormat`]으로 실패합니다.
pub fn to_canonical_version(version: &ModuleVersion) -> Result<String, ScannerError> {
    match version {
        ModuleVersion::Pseudo { hash, .. } if !hash.is_empty() => Ok(format!("#{hash}")),
        ModuleVersion::Exact { version, .. } if !version.is_empty() => {
            Ok(version.strip_prefix('v').unwrap_or(version).to_owned())
        }
        _ => Err(ScannerError::UnexpectedVersionFormat),
    }
}

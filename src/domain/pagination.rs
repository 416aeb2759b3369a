// Limit/offset normalization applied before any list call goes upstream.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default: u32,
    pub max: u32,
}

pub const PLAYLISTS: PageLimits = PageLimits { default: 20, max: 50 };
pub const PLAYLIST_TRACKS: PageLimits = PageLimits { default: 50, max: 100 };
pub const SAVED_TRACKS: PageLimits = PageLimits { default: 50, max: 50 };
pub const SAVED_ALBUMS: PageLimits = PageLimits { default: 20, max: 50 };
pub const SAVED_SHOWS: PageLimits = PageLimits { default: 20, max: 50 };
pub const RECENTLY_PLAYED: PageLimits = PageLimits { default: 20, max: 50 };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    pub fn normalize(limit: Option<&str>, offset: Option<&str>, limits: PageLimits) -> Self {
        Self {
            limit: normalize_limit(limit, limits),
            offset: offset.and_then(parse_positive).unwrap_or(0),
        }
    }
}

// Absent, zero or non-numeric limits fall back to the default; the rest clamp to max.
pub fn normalize_limit(raw: Option<&str>, limits: PageLimits) -> u32 {
    raw.and_then(parse_positive)
        .unwrap_or(limits.default)
        .min(limits.max)
}

fn parse_positive(raw: &str) -> Option<u32> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => None,
        Ok(value) => Some(u32::try_from(value).unwrap_or(u32::MAX)),
    }
}

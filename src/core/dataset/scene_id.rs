use chrono::NaiveDate;

use crate::error::{CurateError, CurateResult};

/// Identity of a scene decoded from its folder name `ddmmyy-Name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneId {
    /// The six digit date token as written in the folder name.
    pub raw_date: String,
    pub name: String,
    pub date: NaiveDate,
}

impl SceneId {
    /// Parse `040625-LundoBin` into (`040625`, `LundoBin`, 2025-06-04).
    ///
    /// The split happens on the first `-`, so names may contain dashes. The two
    /// digit year always maps to 20yy.
    pub fn parse(folder: &str) -> CurateResult<Self> {
        let malformed = |reason: &str| CurateError::MalformedSceneId {
            folder: folder.to_string(),
            reason: reason.to_string(),
        };

        let (raw_date, name) = folder
            .split_once('-')
            .ok_or_else(|| malformed("missing '-' separator"))?;

        if raw_date.len() != 6 || !raw_date.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed("date token must be exactly 6 digits"));
        }
        // Stricter than the bare naming pattern: a scene must carry a name
        if name.is_empty() {
            return Err(malformed(
                "scene name after the date is empty (a non-empty name is required)",
            ));
        }

        // Six ASCII digits, checked above
        let day: u32 = raw_date[0..2].parse().map_err(|_| malformed("bad day"))?;
        let month: u32 = raw_date[2..4].parse().map_err(|_| malformed("bad month"))?;
        let year: i32 = raw_date[4..6].parse().map_err(|_| malformed("bad year"))?;

        let date = NaiveDate::from_ymd_opt(2000 + year, month, day)
            .ok_or_else(|| malformed("not a valid calendar date"))?;

        Ok(Self {
            raw_date: raw_date.to_string(),
            name: name.to_string(),
            date,
        })
    }

    /// ISO-8601 date, e.g. `2025-06-04`.
    pub fn iso_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

//! Duty schedule import.
//!
//! Schedule files are CSV (or the same format saved as `.txt`): a header
//! line, then `date,day,shift,note` rows. Double quotes toggle a quoted run
//! in which commas are literal. Rows with fewer than three fields are
//! skipped, and an empty note is replaced by the default note for the shift.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Header line of the downloadable template.
pub const TEMPLATE_HEADER: &str = "日期,星期,班次,备注";

/// Suggested file name for the template.
pub const TEMPLATE_FILE_NAME: &str = "排班表模板.csv";

/// Note used when the shift has no entry in the default table.
pub const FALLBACK_NOTE: &str = "根据班次模板执行学习计划。";

/// Built-in default notes keyed by exact shift name.
pub const DEFAULT_NOTES: &[(&str, &str)] = &[
    ("A班", "下午15点开始学习，合理安排锻炼。"),
    ("B班", "上午黄金3小时学习，13:00务必午睡半小时。"),
    ("C班", "晚上19:30开始学习，注意12点下班抓紧去食堂。"),
    ("休息", "冲刺日！执行10小时学习，合理安排锻炼。"),
];

/// How long a notice stays visible by default.
pub const DEFAULT_NOTICE_SECS: u64 = 3;

/// Longest notice lifetime; larger configured values are clamped to it.
pub const MAX_NOTICE_SECS: u64 = 24 * 60 * 60;

const SUPPORTED_EXTENSIONS: &[&str] = &[".csv", ".txt"];

static WRAPPING_QUOTES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^"|"$"#).unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub date: String,
    pub day: String,
    pub shift: String,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("不支持的文件格式，请上传CSV文件")]
    UnsupportedFormat,

    #[error("未能解析到有效的排班数据")]
    NoValidRows,

    #[error("{0}")]
    Other(String),
}

impl ImportError {
    /// Wrap an unexpected failure, using the generic message when empty.
    pub fn other(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            ImportError::Other("文件解析失败".to_string())
        } else {
            ImportError::Other(message)
        }
    }
}

// ============================================================================
// Default notes
// ============================================================================

/// Shift → default note table. Starts from the built-in table; configured
/// entries extend or override it.
#[derive(Debug, Clone)]
pub struct DefaultNotes {
    notes: BTreeMap<String, String>,
}

impl Default for DefaultNotes {
    fn default() -> Self {
        Self {
            notes: DEFAULT_NOTES
                .iter()
                .map(|(shift, note)| (shift.to_string(), note.to_string()))
                .collect(),
        }
    }
}

impl DefaultNotes {
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut table = Self::default();
        for (shift, note) in overrides {
            table.notes.insert(shift.clone(), note.clone());
        }
        table
    }

    /// Default note for an exact shift match, or the generic fallback.
    pub fn for_shift(&self, shift: &str) -> &str {
        self.notes
            .get(shift)
            .map(String::as_str)
            .unwrap_or(FALLBACK_NOTE)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.notes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Split one line on commas outside double quotes. Quotes are dropped and
/// every field is trimmed.
pub fn split_fields(line: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    parts.push(current.trim().to_string());

    parts
}

fn strip_wrapping_quotes(s: &str) -> String {
    WRAPPING_QUOTES_RE.replace_all(s, "").into_owned()
}

/// Parse one data line. Returns `None` for lines with fewer than 3 fields.
pub fn parse_line(line: &str, notes: &DefaultNotes) -> Option<ScheduleEntry> {
    let parts = split_fields(line);
    if parts.len() < 3 {
        return None;
    }

    let shift = strip_wrapping_quotes(&parts[2]);
    let note = strip_wrapping_quotes(&parts[3..].join(","));
    let note = if note.is_empty() {
        notes.for_shift(&shift).to_string()
    } else {
        note
    };

    Some(ScheduleEntry {
        date: strip_wrapping_quotes(&parts[0]),
        day: strip_wrapping_quotes(&parts[1]),
        shift,
        note,
    })
}

/// Parse file content: the first line is a header, blank lines are ignored.
pub fn parse_schedule(content: &str, notes: &DefaultNotes) -> Vec<ScheduleEntry> {
    content
        .trim()
        .split('\n')
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| parse_line(line, notes))
        .collect()
}

/// Check that a file name has a supported extension.
pub fn check_format(file_name: &str) -> Result<(), ImportError> {
    if SUPPORTED_EXTENSIONS.iter().any(|ext| file_name.ends_with(ext)) {
        Ok(())
    } else {
        Err(ImportError::UnsupportedFormat)
    }
}

/// Import an uploaded file. The format is checked before any parsing.
pub fn import(
    file_name: &str,
    content: &str,
    notes: &DefaultNotes,
) -> Result<Vec<ScheduleEntry>, ImportError> {
    check_format(file_name)?;
    let entries = parse_schedule(content, notes);
    if entries.is_empty() {
        return Err(ImportError::NoValidRows);
    }
    log::debug!("parsed {} schedule rows from {}", entries.len(), file_name);
    Ok(entries)
}

/// Import raw file bytes. The format is checked first; content that is not
/// valid UTF-8 is an `ImportError::Other`.
pub fn import_bytes(
    file_name: &str,
    bytes: &[u8],
    notes: &DefaultNotes,
) -> Result<Vec<ScheduleEntry>, ImportError> {
    check_format(file_name)?;
    let content = std::str::from_utf8(bytes).map_err(|e| ImportError::other(e.to_string()))?;
    import(file_name, content, notes)
}

/// Month label for an imported file: the name without its extension.
pub fn month_label(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| file_name.to_string())
}

/// Template file content: header plus sample rows the importer accepts.
pub fn template() -> String {
    [
        TEMPLATE_HEADER,
        "3月1日,星期日,A班,下午15点开始学习，傍晚安排跑步。",
        "3月2日,星期一,A班,下午15点开始学习，傍晚安排力量训练。",
        "3月3日,星期二,B班,上午黄金3小时学习，13:00务必午睡半小时。",
        "3月4日,星期三,休息,冲刺日！执行10小时学习，傍晚跑步。",
        "3月5日,星期四,C班,晚上19:30开始学习，注意12点下班抓紧去食堂。",
    ]
    .join("\n")
}

// ============================================================================
// Schedule board
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// A transient status message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    /// `None` means it stays until replaced.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Notice {
    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// A file picked for upload, consumed by `ScheduleBoard::upload`.
#[derive(Debug, Default)]
pub struct PendingUpload {
    file: Option<(String, Vec<u8>)>,
}

impl PendingUpload {
    pub fn new(file_name: &str, content: impl Into<Vec<u8>>) -> Self {
        Self {
            file: Some((file_name.to_string(), content.into())),
        }
    }
}

fn notice_ttl(secs: u64) -> Duration {
    // clamped, so the conversion cannot fail
    Duration::try_seconds(secs.min(MAX_NOTICE_SECS) as i64).unwrap_or(Duration::zero())
}

/// The displayed schedule and its upload status.
#[derive(Debug, Clone)]
pub struct ScheduleBoard {
    entries: Vec<ScheduleEntry>,
    month: String,
    notice: Option<Notice>,
    notice_ttl: Duration,
    notes: DefaultNotes,
}

impl ScheduleBoard {
    pub fn new(entries: Vec<ScheduleEntry>, month: &str, notes: DefaultNotes) -> Self {
        Self {
            entries,
            month: month.to_string(),
            notice: None,
            notice_ttl: notice_ttl(DEFAULT_NOTICE_SECS),
            notes,
        }
    }

    /// Set the success notice lifetime, clamped to `MAX_NOTICE_SECS`.
    pub fn with_notice_ttl(mut self, secs: u64) -> Self {
        self.notice_ttl = notice_ttl(secs);
        self
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn month(&self) -> &str {
        &self.month
    }

    /// The current notice, if still visible at `now`.
    pub fn notice(&self, now: DateTime<Utc>) -> Option<&Notice> {
        self.notice.as_ref().filter(|n| n.is_visible(now))
    }

    /// Import the pending file.
    ///
    /// The pending upload is always cleared; an empty one imports nothing.
    /// On success the entries are
    /// replaced and a success notice expires after the configured time; on
    /// failure an error notice is shown and the entries are left untouched.
    pub fn upload(
        &mut self,
        pending: &mut PendingUpload,
        now: DateTime<Utc>,
    ) -> Result<usize, ImportError> {
        let Some((file_name, content)) = pending.file.take() else {
            return Ok(0);
        };

        match import_bytes(&file_name, &content, &self.notes) {
            Ok(entries) => {
                let count = entries.len();
                self.entries = entries;
                self.month = month_label(&file_name);
                self.notice = Some(Notice {
                    kind: NoticeKind::Success,
                    message: format!("已导入 {} 条排班", count),
                    // past the end of time the notice simply never expires
                    expires_at: now.checked_add_signed(self.notice_ttl),
                });
                Ok(count)
            }
            Err(err) => {
                log::warn!("schedule import of {} failed: {}", file_name, err);
                self.notice = Some(Notice {
                    kind: NoticeKind::Error,
                    message: err.to_string(),
                    expires_at: None,
                });
                Err(err)
            }
        }
    }

    /// Count entries per shift, in first-seen order.
    pub fn shift_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for entry in &self.entries {
            match counts.iter_mut().find(|(shift, _)| *shift == entry.shift) {
                Some((_, n)) => *n += 1,
                None => counts.push((entry.shift.clone(), 1)),
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes() -> DefaultNotes {
        DefaultNotes::default()
    }

    fn entry(date: &str, day: &str, shift: &str, note: &str) -> ScheduleEntry {
        ScheduleEntry {
            date: date.to_string(),
            day: day.to_string(),
            shift: shift.to_string(),
            note: note.to_string(),
        }
    }

    #[test]
    fn test_quoted_comma_stays_in_note() {
        let parsed = parse_line("3月1日,星期日,A班,\"备注，含逗号\"", &notes()).unwrap();
        assert_eq!(parsed, entry("3月1日", "星期日", "A班", "备注，含逗号"));

        let parsed = parse_line("3月1日,星期日,A班,\"a, b\"", &notes()).unwrap();
        assert_eq!(parsed.note, "a, b");
    }

    #[test]
    fn test_unquoted_extra_fields_are_rejoined() {
        let parsed = parse_line("3月2日,星期一,B班,one,two", &notes()).unwrap();
        assert_eq!(parsed.note, "one,two");
    }

    #[test]
    fn test_empty_note_gets_shift_default() {
        let parsed = parse_line("3月4日,星期三,休息,", &notes()).unwrap();
        assert_eq!(parsed.note, "冲刺日！执行10小时学习，合理安排锻炼。");

        let parsed = parse_line("3月4日,星期三,休息", &notes()).unwrap();
        assert_eq!(parsed.note, "冲刺日！执行10小时学习，合理安排锻炼。");
    }

    #[test]
    fn test_unknown_shift_gets_fallback_note() {
        let parsed = parse_line("3月9日,星期一,夜班,", &notes()).unwrap();
        assert_eq!(parsed.note, FALLBACK_NOTE);
    }

    #[test]
    fn test_short_lines_are_dropped() {
        assert_eq!(parse_line("3月4日,星期三", &notes()), None);
        assert_eq!(parse_line("just text", &notes()), None);
    }

    #[test]
    fn test_fields_are_trimmed() {
        let parsed = parse_line(" 3月5日 , 星期四 , C班 ,  晚上学习 ", &notes()).unwrap();
        assert_eq!(parsed, entry("3月5日", "星期四", "C班", "晚上学习"));
    }

    #[test]
    fn test_header_always_discarded_and_blank_lines_skipped() {
        let content = "3月1日,星期日,A班,header-looking row\n\n3月2日,星期一,B班,x\r\n  \n";
        let parsed = parse_schedule(content, &notes());
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].date, "3月2日");
        assert_eq!(parsed[0].note, "x");
    }

    #[test]
    fn test_duplicate_dates_are_kept() {
        let content = "h\n3月1日,星期日,A班,a\n3月1日,星期日,B班,b";
        assert_eq!(parse_schedule(content, &notes()).len(), 2);
    }

    #[test]
    fn test_format_rejected_before_parsing() {
        let err = import("schedule.pdf", &template(), &notes()).unwrap_err();
        assert_eq!(err, ImportError::UnsupportedFormat);
        assert_eq!(err.to_string(), "不支持的文件格式，请上传CSV文件");
    }

    #[test]
    fn test_txt_parsed_like_csv() {
        let csv = import("march.csv", &template(), &notes()).unwrap();
        let txt = import("march.txt", &template(), &notes()).unwrap();
        assert_eq!(csv, txt);
    }

    #[test]
    fn test_header_only_is_no_valid_rows() {
        let err = import("s.csv", "日期,星期,班次,备注\n\n   \n", &notes()).unwrap_err();
        assert_eq!(err, ImportError::NoValidRows);
        assert_eq!(err.to_string(), "未能解析到有效的排班数据");
    }

    #[test]
    fn test_template_round_trips() {
        let text = template();
        assert!(text.starts_with("日期,星期,班次,备注\n"));
        let parsed = import(TEMPLATE_FILE_NAME, &text, &notes()).unwrap();
        assert_eq!(parsed.len(), 5);
        assert_eq!(parsed[3].shift, "休息");
        assert_eq!(parsed[4].note, "晚上19:30开始学习，注意12点下班抓紧去食堂。");
    }

    #[test]
    fn test_configured_notes_override_defaults() {
        let mut overrides = BTreeMap::new();
        overrides.insert("A班".to_string(), "custom".to_string());
        overrides.insert("D班".to_string(), "night".to_string());
        let table = DefaultNotes::with_overrides(&overrides);
        assert_eq!(table.for_shift("A班"), "custom");
        assert_eq!(table.for_shift("D班"), "night");
        assert_eq!(table.for_shift("B班"), "上午黄金3小时学习，13:00务必午睡半小时。");
    }

    #[test]
    fn test_other_error_message_fallback() {
        assert_eq!(ImportError::other("").to_string(), "文件解析失败");
        assert_eq!(ImportError::other("bad utf-8").to_string(), "bad utf-8");
    }

    #[test]
    fn test_month_label() {
        assert_eq!(month_label("2026年4月.csv"), "2026年4月");
        assert_eq!(month_label("plain"), "plain");
    }

    #[test]
    fn test_board_success_replaces_entries_and_notice_expires() {
        let now = Utc::now();
        let mut board = ScheduleBoard::new(Vec::new(), "2026年3月", notes());
        let mut pending = PendingUpload::new("2026年4月.csv", template());

        assert_eq!(board.upload(&mut pending, now), Ok(5));
        assert_eq!(board.upload(&mut pending, now), Ok(0));
        assert_eq!(board.entries().len(), 5);
        assert_eq!(board.month(), "2026年4月");

        let notice = board.notice(now).unwrap();
        assert_eq!(notice.kind, NoticeKind::Success);
        assert!(board.notice(now + Duration::seconds(2)).is_some());
        assert!(board.notice(now + Duration::seconds(3)).is_none());
    }

    #[test]
    fn test_board_failure_keeps_entries() {
        let now = Utc::now();
        let original = parse_schedule(&template(), &notes());
        let mut board = ScheduleBoard::new(original.clone(), "2026年3月", notes());

        let mut pending = PendingUpload::new("empty.csv", "日期,星期,班次,备注\n\n");
        assert_eq!(board.upload(&mut pending, now), Err(ImportError::NoValidRows));
        assert_eq!(board.upload(&mut pending, now), Ok(0));
        assert_eq!(board.entries(), original.as_slice());
        assert_eq!(board.month(), "2026年3月");
        assert_eq!(board.notice(now).unwrap().kind, NoticeKind::Error);

        let mut pending = PendingUpload::new("schedule.pdf", "whatever");
        assert_eq!(board.upload(&mut pending, now), Err(ImportError::UnsupportedFormat));
        assert_eq!(board.entries(), original.as_slice());
    }

    #[test]
    fn test_board_rejects_non_utf8_content() {
        let now = Utc::now();
        let original = parse_schedule(&template(), &notes());
        let mut board = ScheduleBoard::new(original.clone(), "2026年3月", notes());

        // "日期" in GBK
        let gbk: Vec<u8> = vec![0xc8, 0xd5, 0xc6, 0xda, b'\n', b'1', b',', b'2', b',', b'3'];
        let mut pending = PendingUpload::new("gbk.csv", gbk.clone());
        let err = board.upload(&mut pending, now).unwrap_err();
        assert!(matches!(err, ImportError::Other(ref m) if !m.is_empty()));
        assert_eq!(board.entries(), original.as_slice());

        let notice = board.notice(now).unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, err.to_string());

        // the format check still comes first
        let mut pending = PendingUpload::new("gbk.xlsx", gbk);
        assert_eq!(board.upload(&mut pending, now), Err(ImportError::UnsupportedFormat));
    }

    #[test]
    fn test_huge_notice_ttl_is_clamped() {
        let now = Utc::now();
        for secs in [10_000_000_000_000_000, 9_000_000_000_000_000, u64::MAX] {
            let mut board = ScheduleBoard::new(Vec::new(), "m", notes()).with_notice_ttl(secs);
            let mut pending = PendingUpload::new("april.csv", template());
            assert_eq!(board.upload(&mut pending, now), Ok(5));

            let notice = board.notice(now).unwrap();
            assert_eq!(notice.kind, NoticeKind::Success);
            assert_eq!(
                notice.expires_at,
                Some(now + Duration::seconds(MAX_NOTICE_SECS as i64))
            );
        }
    }

    #[test]
    fn test_notice_without_expiry_near_max_date() {
        let mut board = ScheduleBoard::new(Vec::new(), "m", notes());
        let mut pending = PendingUpload::new("april.csv", template());
        let end = DateTime::<Utc>::MAX_UTC;
        assert_eq!(board.upload(&mut pending, end), Ok(5));
        let notice = board.notice(end).unwrap();
        assert_eq!(notice.expires_at, None);
    }

    #[test]
    fn test_shift_counts() {
        let board = ScheduleBoard::new(parse_schedule(&template(), &notes()), "m", notes());
        assert_eq!(
            board.shift_counts(),
            vec![
                ("A班".to_string(), 2),
                ("B班".to_string(), 1),
                ("休息".to_string(), 1),
                ("C班".to_string(), 1),
            ]
        );
    }
}

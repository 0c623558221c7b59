use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// localStorage key the login flag persists under across reloads.
pub const AUTH_STORAGE_KEY: &str = "isLoggedIn";

// ---------- CSV ---------------------------------------------------------------

/// One CSV data line keyed by header name. Rows are rebuilt on every fetch
/// and carry no identity beyond their position in the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    cells: HashMap<String, String>,
}

impl CsvRow {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.cells.get(key).map(String::as_str)
    }

    /// Cell value with missing columns projected to the empty string.
    pub fn get_or_empty(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Parsed CSV resource: ordered headers plus one row per data line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<CsvRow>,
}

impl CsvTable {
    /// Split raw text into header and data rows. Fields are separated by
    /// bare commas with no quoting or escaping, so a comma inside a field
    /// shifts every column after it. Leading/trailing blank lines are
    /// dropped by trimming before the split; interior blank lines become
    /// rows whose first column is empty, exactly like the source data.
    pub fn parse(text: &str) -> CsvTable {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return CsvTable::default();
        }

        let mut lines = trimmed.lines();
        let headers: Vec<String> = lines
            .next()
            .unwrap_or_default()
            .split(',')
            .map(str::to_string)
            .collect();

        let rows = lines
            .map(|line| {
                let mut cells = HashMap::new();
                for (idx, cell) in line.split(',').enumerate() {
                    // Cells past the header count are dropped; short lines
                    // simply leave the remaining keys absent.
                    if let Some(header) = headers.get(idx) {
                        cells.insert(header.clone(), cell.to_string());
                    }
                }
                CsvRow { cells }
            })
            .collect();

        CsvTable { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------- List items --------------------------------------------------------

/// One news article (`title,url,press,date`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    pub press: String,
    pub date: String,
}

impl NewsItem {
    pub fn from_row(row: &CsvRow) -> NewsItem {
        NewsItem {
            title: row.get_or_empty("title").to_string(),
            url: row.get_or_empty("url").to_string(),
            press: row.get_or_empty("press").to_string(),
            date: row.get_or_empty("date").to_string(),
        }
    }

    /// Metadata line rendered under the title link.
    pub fn meta_line(&self) -> String {
        format!("{} | {}", self.press, self.date)
    }
}

/// One broker research report (`stock,title,url,broker,date,rating`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchItem {
    pub stock: String,
    pub title: String,
    pub url: String,
    pub broker: String,
    pub date: String,
    pub rating: String,
}

impl ResearchItem {
    pub fn from_row(row: &CsvRow) -> ResearchItem {
        ResearchItem {
            stock: row.get_or_empty("stock").to_string(),
            title: row.get_or_empty("title").to_string(),
            url: row.get_or_empty("url").to_string(),
            broker: row.get_or_empty("broker").to_string(),
            date: row.get_or_empty("date").to_string(),
            rating: row.get_or_empty("rating").to_string(),
        }
    }

    pub fn meta_line(&self) -> String {
        format!("{} | {} | {}", self.broker, self.date, self.rating)
    }
}

pub fn news_items(table: &CsvTable) -> Vec<NewsItem> {
    table.rows.iter().map(NewsItem::from_row).collect()
}

pub fn research_items(table: &CsvTable) -> Vec<ResearchItem> {
    table.rows.iter().map(ResearchItem::from_row).collect()
}

// ---------- Search-category dropdown ------------------------------------------

/// Open/closed state of the search-category widget plus the label adopted
/// from the last selected menu item. Nothing here persists across reloads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropdownState {
    pub open: bool,
    pub selected: Option<String>,
}

impl DropdownState {
    pub fn new() -> DropdownState {
        DropdownState::default()
    }

    /// Toggle-button click flips the menu.
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Menu-item click adopts the item's value and closes the menu.
    pub fn select(&mut self, value: &str) {
        self.selected = Some(value.to_string());
        self.open = false;
    }

    /// Clicks outside the widget force the menu closed.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Text shown on the toggle button.
    pub fn label<'a>(&'a self, default: &'a str) -> &'a str {
        self.selected.as_deref().unwrap_or(default)
    }
}

// ---------- Auth flag ---------------------------------------------------------

/// In-memory login flag. Persistent storage is the source of truth; the
/// page loads it once at startup and mirrors every change back through the
/// session setter, so memory and storage agree after each call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    logged_in: bool,
}

impl AuthState {
    /// Decode the persisted value. Only the exact string "true" counts as
    /// logged in; absence, junk, or an upstream read failure all land here
    /// as `None` or a mismatch and decode to logged out.
    pub fn from_stored(raw: Option<&str>) -> AuthState {
        AuthState {
            logged_in: raw == Some("true"),
        }
    }

    pub fn logged_in(self) -> bool {
        self.logged_in
    }

    pub fn set(&mut self, logged_in: bool) {
        self.logged_in = logged_in;
    }

    /// Encoding written back to storage.
    pub fn storage_value(self) -> &'static str {
        if self.logged_in {
            "true"
        } else {
            "false"
        }
    }
}

// ---------- Modal messages ----------------------------------------------------

/// Fixed UI strings for the login modal. Server-provided text always wins;
/// these are the fallbacks the page shows when the reply carries none.
pub mod messages {
    pub const LOGIN_OK: &str = "로그인 성공";
    pub const LOGIN_FAILED: &str = "로그인 실패";
    pub const SIGNUP_OK: &str = "회원가입 성공. 이제 로그인 해 주세요.";
    pub const SIGNUP_FAILED: &str = "회원가입 실패";
    pub const PASSWORD_MISMATCH: &str = "비밀번호가 서로 다릅니다.";
    pub const NETWORK_ERROR: &str = "서버와 통신 중 오류가 발생했습니다.";
}

/// Client-side pre-check run before a signup request goes out; a mismatch
/// means no network call at all.
pub fn passwords_match(password: &str, confirm: &str) -> bool {
    password == confirm
}

#[cfg(test)]
mod tests {
    use super::*;

    fn news_table() -> CsvTable {
        CsvTable::parse("title,url,press,date\nA,http://x,Press1,2024-01-01\nB,http://y,Press2,2024-01-02")
    }

    #[test]
    fn parse_keeps_row_and_column_counts() {
        let table = news_table();
        assert_eq!(table.headers.len(), 4);
        assert_eq!(table.rows.len(), 2);
        for row in &table.rows {
            assert_eq!(row.len(), 4);
        }
        assert_eq!(table.rows[0].get("title"), Some("A"));
        assert_eq!(table.rows[1].get("date"), Some("2024-01-02"));
    }

    #[test]
    fn parse_handles_crlf_and_trailing_blank_lines() {
        let table = CsvTable::parse("title,url\r\nA,http://x\r\n\r\n");
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].get("url"), Some("http://x"));
    }

    #[test]
    fn parse_of_empty_text_is_empty() {
        let table = CsvTable::parse("   \n  ");
        assert!(table.headers.is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn short_line_leaves_keys_absent_and_long_line_drops_extras() {
        let table = CsvTable::parse("a,b,c\n1,2\n1,2,3,4");
        assert_eq!(table.rows[0].get("c"), None);
        assert_eq!(table.rows[0].get_or_empty("c"), "");
        assert_eq!(table.rows[1].len(), 3);
        assert_eq!(table.rows[1].get("c"), Some("3"));
    }

    #[test]
    fn comma_inside_field_shifts_columns() {
        // No quoting: the comma in the title bleeds into the next column.
        let table = CsvTable::parse("title,url\nHello, world,http://x");
        assert_eq!(table.rows[0].get("title"), Some("Hello"));
        assert_eq!(table.rows[0].get("url"), Some(" world"));
    }

    #[test]
    fn news_item_scenario_row() {
        let items = news_items(&news_table());
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "A");
        assert_eq!(items[0].url, "http://x");
        assert_eq!(items[0].meta_line(), "Press1 | 2024-01-01");
    }

    #[test]
    fn research_item_meta_line() {
        let table = CsvTable::parse(
            "stock,title,url,broker,date,rating\n삼성전자,목표가 상향,http://r,한투,2024-02-01,Buy",
        );
        let items = research_items(&table);
        assert_eq!(items[0].stock, "삼성전자");
        assert_eq!(items[0].meta_line(), "한투 | 2024-02-01 | Buy");
    }

    #[test]
    fn missing_column_projects_to_empty_string() {
        let table = CsvTable::parse("title,url\nA,http://x");
        let item = NewsItem::from_row(&table.rows[0]);
        assert_eq!(item.press, "");
        assert_eq!(item.meta_line(), " | ");
    }

    #[test]
    fn dropdown_click_policy() {
        let mut state = DropdownState::new();
        assert!(!state.open);

        state.toggle();
        assert!(state.open);
        state.toggle();
        assert!(!state.open);

        state.toggle();
        state.select("뉴스");
        assert!(!state.open);
        assert_eq!(state.label("전체"), "뉴스");

        state.toggle();
        state.close(); // outside click
        assert!(!state.open);
        // Selection survives the close.
        assert_eq!(state.label("전체"), "뉴스");
    }

    #[test]
    fn dropdown_label_defaults_until_selection() {
        let state = DropdownState::new();
        assert_eq!(state.label("전체"), "전체");
    }

    #[test]
    fn auth_state_round_trips_through_storage_value() {
        let mut auth = AuthState::default();
        assert!(!auth.logged_in());

        auth.set(true);
        assert_eq!(auth.storage_value(), "true");
        let reloaded = AuthState::from_stored(Some(auth.storage_value()));
        assert!(reloaded.logged_in());

        auth.set(false);
        assert_eq!(auth.storage_value(), "false");
        let reloaded = AuthState::from_stored(Some(auth.storage_value()));
        assert!(!reloaded.logged_in());
    }

    #[test]
    fn auth_state_treats_junk_as_logged_out() {
        assert!(!AuthState::from_stored(None).logged_in());
        assert!(!AuthState::from_stored(Some("TRUE")).logged_in());
        assert!(!AuthState::from_stored(Some("1")).logged_in());
    }

    #[test]
    fn password_precheck() {
        assert!(passwords_match("abc123", "abc123"));
        assert!(!passwords_match("abc123", "abc124"));
        assert!(!passwords_match("abc123", ""));
    }
}

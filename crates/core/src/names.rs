//! Name normalization for items and software titles.
//!
//! Coverage joins inventory and requirements by exact name, so every name is
//! normalized once at import time. Two spellings of the same thing that are
//! not reconciled here show up as a deficit on one side and a surplus on the other.

use std::collections::HashMap;

/// Collapse runs of whitespace into single spaces and trim both ends.
pub fn normalize_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize an optional text field: blank values become `None`.
///
/// CSV exports frequently carry `nan`/`NaN` for empty cells; those are treated as blank too.
pub fn normalize_optional(raw: Option<&str>) -> Option<String> {
    let value = normalize_whitespace(raw?);
    if value.is_empty() || value.eq_ignore_ascii_case("nan") {
        None
    } else {
        Some(value)
    }
}

fn lookup_key(raw: &str) -> String {
    normalize_whitespace(raw).to_lowercase()
}

fn strip_parenthesized(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut depth = 0usize;
    for ch in raw.chars() {
        match ch {
            '(' => depth += 1,
            ')' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Variant → canonical item name mapping.
///
/// Keys are compared case-insensitively after whitespace normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynonymTable {
    entries: HashMap<String, String>,
}

impl SynonymTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a variant spelling. Blank variants or canonicals are ignored.
    pub fn insert(&mut self, variant: &str, canonical: &str) {
        let key = lookup_key(variant);
        let canonical = normalize_whitespace(canonical);
        if !key.is_empty() && !canonical.is_empty() {
            self.entries.insert(key, canonical);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get(&self, raw: &str) -> Option<&str> {
        self.entries.get(&lookup_key(raw)).map(String::as_str)
    }
}

impl<V: AsRef<str>, C: AsRef<str>> FromIterator<(V, C)> for SynonymTable {
    fn from_iter<I: IntoIterator<Item = (V, C)>>(iter: I) -> Self {
        let mut table = SynonymTable::new();
        for (variant, canonical) in iter {
            table.insert(variant.as_ref(), canonical.as_ref());
        }
        table
    }
}

/// Canonical item name.
///
/// Resolution order: synonym table on the full name, synonym table on the name
/// with parenthesized qualifiers removed, built-in keyword rules, and finally
/// the name without qualifiers.
pub fn canonicalize_item(raw: &str, synonyms: &SynonymTable) -> String {
    let name = normalize_whitespace(raw);
    if name.is_empty() {
        return name;
    }
    if let Some(canonical) = synonyms.get(&name) {
        return canonical.to_string();
    }
    let bare = normalize_whitespace(&strip_parenthesized(&name));
    if let Some(canonical) = synonyms.get(&bare) {
        return canonical.to_string();
    }
    if let Some(canonical) = keyword_item(&bare.to_lowercase()) {
        return canonical.to_string();
    }
    // A name that is nothing but a qualifier keeps its text.
    if bare.is_empty() { name } else { bare }
}

/// Keyword rules for equipment that shows up under vendor or model names.
///
/// Order matters: DGS is a D-Link switch line, so switches are matched before
/// the generic D-Link router rule.
fn keyword_item(low: &str) -> Option<&'static str> {
    let has = |needles: &[&str]| needles.iter().any(|n| low.contains(n));

    if low.contains("персональн") && low.contains("компьютер") {
        return Some("Персональный компьютер");
    }
    if low.contains("компьютер") && low.contains("преподав") {
        return Some("Компьютер преподавателя");
    }
    if low.contains("ибп") {
        return Some("ИБП");
    }
    if low.contains("сервер") {
        return Some("Сервер учебный");
    }
    if has(&["switch", "коммут", "baseline", "dgs"]) {
        return Some("Коммутатор");
    }
    if has(&["маршрут", "router", "mikrotik", "cisco", "d-link", "dlink"]) {
        return Some("Маршрутизатор");
    }
    if has(&["патч", "patch"]) {
        return Some("Набор кабелей/патч-кордов");
    }
    if has(&["тестер", "tester"]) && has(&["вит", "twisted", "кабель", "cable"]) {
        return Some("Тестер витой пары");
    }
    if has(&["iphone", "ios"]) {
        return Some("Смартфон iOS для тестирования");
    }
    if low.contains("android") {
        return Some("Смартфон Android для тестирования");
    }
    None
}

/// Canonical software title for the handful of products that appear under many spellings.
pub fn canonicalize_software(raw: &str) -> String {
    let name = normalize_whitespace(raw);
    let low = name.to_lowercase();

    if low.contains("visual studio code") || low == "vscode" || low.contains("vs code") {
        return "VS Code".to_string();
    }
    if low.starts_with("python") {
        return "Python".to_string();
    }
    if low.starts_with("postgres") || low.contains("postgresql") {
        return "PostgreSQL".to_string();
    }
    if low.starts_with("docker") {
        return "Docker".to_string();
    }
    if low.contains("wireshark") {
        return "Wireshark".to_string();
    }

    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_is_collapsed_and_trimmed() {
        assert_eq!(normalize_whitespace("  Персональный \t компьютер\n"), "Персональный компьютер");
        assert_eq!(normalize_whitespace("   "), "");
    }

    #[test]
    fn blank_and_nan_optionals_become_none() {
        assert_eq!(normalize_optional(None), None);
        assert_eq!(normalize_optional(Some("  ")), None);
        assert_eq!(normalize_optional(Some("nan")), None);
        assert_eq!(normalize_optional(Some(" Лаборатория  201 ")), Some("Лаборатория 201".to_string()));
    }

    #[test]
    fn synonyms_match_case_insensitively() {
        let table: SynonymTable = [("ПК", "Персональный компьютер")].into_iter().collect();
        assert_eq!(canonicalize_item("пк", &table), "Персональный компьютер");
        assert_eq!(canonicalize_item("  ПК  ", &table), "Персональный компьютер");
    }

    #[test]
    fn synonyms_fall_back_to_name_without_qualifiers() {
        let table: SynonymTable = [("ИБП", "Источник бесперебойного питания")].into_iter().collect();
        assert_eq!(
            canonicalize_item("ИБП (APC 650)", &table),
            "Источник бесперебойного питания"
        );
    }

    #[test]
    fn unmatched_item_drops_qualifiers() {
        let table = SynonymTable::new();
        assert_eq!(canonicalize_item("Проектор  (Epson EB-X51)", &table), "Проектор");
        assert_eq!(canonicalize_item("(без названия)", &table), "(без названия)");
    }

    #[test]
    fn keyword_rules_collapse_vendor_spellings() {
        let table = SynonymTable::new();
        let cases = [
            ("Персональный компьютер Intel i5", "Персональный компьютер"),
            ("Коммутатор D-Link DGS-1100", "Коммутатор"),
            ("D-Link DGS-1100-24", "Коммутатор"),
            ("Маршрутизатор (Mikrotik)", "Маршрутизатор"),
            ("Cisco 1941", "Маршрутизатор"),
            ("Сервер Dell R740", "Сервер учебный"),
            ("ИБП APC Back-UPS", "ИБП"),
            ("Компьютер преподавателя", "Компьютер преподавателя"),
            ("Патч-корд RJ45 1м", "Набор кабелей/патч-кордов"),
            ("Тестер кабеля витой пары", "Тестер витой пары"),
            ("iPhone 12", "Смартфон iOS для тестирования"),
            ("Смартфон Android Samsung", "Смартфон Android для тестирования"),
        ];
        for (raw, expected) in cases {
            assert_eq!(canonicalize_item(raw, &table), expected, "{raw}");
        }
    }

    #[test]
    fn synonyms_win_over_keyword_rules() {
        let table: SynonymTable = [("Сервер Dell R740", "Сервер виртуализации")].into_iter().collect();
        assert_eq!(canonicalize_item("Сервер Dell R740", &table), "Сервер виртуализации");
        assert_eq!(canonicalize_item("Сервер HP", &table), "Сервер учебный");
    }

    #[test]
    fn blank_synonym_entries_are_ignored() {
        let table: SynonymTable = [("", "x"), ("y", " ")].into_iter().collect();
        assert!(table.is_empty());
    }

    #[test]
    fn software_spellings_are_canonicalized() {
        assert_eq!(canonicalize_software("Visual Studio Code 1.85"), "VS Code");
        assert_eq!(canonicalize_software("vscode"), "VS Code");
        assert_eq!(canonicalize_software("Python 3.12"), "Python");
        assert_eq!(canonicalize_software("postgres 16"), "PostgreSQL");
        assert_eq!(canonicalize_software("Docker Desktop"), "Docker");
        assert_eq!(canonicalize_software("Wireshark  4"), "Wireshark");
        assert_eq!(canonicalize_software("  1С:Предприятие "), "1С:Предприятие");
    }
}

//! Helpers for scraping fields out of CLI output.
//!
//! All helpers are permissive: a pattern that matches nothing yields `None`
//! or an empty list, never an error. Patterns are matched line by line, so
//! `^` and `$` anchor to a line.
//!
//! # Example
//!
//! ```
//! use cliunit_common::parsing;
//! use regex::Regex;
//!
//! let output = "interface Loopback0\n mtu 1500\n shutdown\n";
//! let mtu = Regex::new(r"^\s*mtu (?<mtu>\d+)$").unwrap();
//!
//! let value: Option<u16> = parsing::parse_field(output, &mtu, |c| c["mtu"].parse().ok());
//! assert_eq!(value, Some(1500));
//! ```

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Line separator accepted in device output.
pub static NEWLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n").expect("Invalid regex pattern"));

/// Splits output into lines with trailing whitespace removed.
pub fn lines(output: &str) -> impl Iterator<Item = &str> {
    NEWLINE.split(output).map(str::trim_end)
}

/// Returns the first value extracted from a matching line.
///
/// Lines whose captures are rejected by `extract` (e.g. an unparsable
/// number) are skipped.
pub fn parse_field<T, F>(output: &str, pattern: &Regex, extract: F) -> Option<T>
where
    F: Fn(&Captures<'_>) -> Option<T>,
{
    lines(output)
        .filter_map(|line| pattern.captures(line))
        .find_map(|caps| extract(&caps))
}

/// Returns every value extracted from matching lines, in output order.
pub fn parse_fields<T, F>(output: &str, pattern: &Regex, extract: F) -> Vec<T>
where
    F: Fn(&Captures<'_>) -> Option<T>,
{
    lines(output)
        .filter_map(|line| pattern.captures(line))
        .filter_map(|caps| extract(&caps))
        .collect()
}

/// Returns the sorted, de-duplicated keys extracted from matching lines.
pub fn parse_keys<T, F>(output: &str, pattern: &Regex, extract: F) -> Vec<T>
where
    T: Ord,
    F: Fn(&Captures<'_>) -> Option<T>,
{
    parse_fields(output, pattern, extract)
        .into_iter()
        .sorted()
        .dedup()
        .collect()
}

/// Returns true if any line matches.
pub fn contains_line(output: &str, pattern: &Regex) -> bool {
    lines(output).any(|line| pattern.is_match(line))
}

/// Strips double quotes from a value written with `\"` escapes.
///
/// Unquoted values are returned as they are.
pub fn unquote(value: &str) -> String {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .map(|v| v.replace("\\\"", "\""))
        .unwrap_or_else(|| value.to_string())
}

/// A configuration block: an unindented header line and its indented body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    pub header: &'a str,
    pub body: Vec<&'a str>,
}

impl Section<'_> {
    /// The body joined back into text, one line per body line.
    pub fn body_text(&self) -> String {
        self.body.iter().join("\n")
    }
}

/// Splits running-config style output into blocks.
///
/// A block starts at an unindented line matching `header` and takes every
/// following indented line. Unindented lines that do not match `header`
/// (`!`, other top-level commands) end the current block.
pub fn split_sections<'a>(output: &'a str, header: &Regex) -> Vec<Section<'a>> {
    let mut sections = Vec::new();
    let mut current: Option<Section<'a>> = None;

    for line in lines(output) {
        let indented = line.starts_with(char::is_whitespace);
        if indented {
            if let Some(section) = current.as_mut() {
                section.body.push(line);
            }
            continue;
        }

        if let Some(section) = current.take() {
            sections.push(section);
        }
        if header.is_match(line) {
            current = Some(Section {
                header: line,
                body: Vec::new(),
            });
        }
    }

    if let Some(section) = current {
        sections.push(section);
    }
    sections
}

/// Finds the block whose header captures `name` in group `group`.
pub fn find_section<'a>(
    output: &'a str,
    header: &Regex,
    group: &str,
    name: &str,
) -> Option<Section<'a>> {
    split_sections(output, header).into_iter().find(|section| {
        header
            .captures(section.header)
            .and_then(|caps| caps.name(group))
            .is_some_and(|m| m.as_str() == name)
    })
}

/// Extracts items, pairing each with the nearest preceding header line.
///
/// Used where the same item line means different things depending on the
/// block it sits in: neighbors under `address-family ipv4 vrf X`, rows of
/// the downstream vs. upstream channel table. Items before the first
/// header get `None`.
pub fn parse_under_header<T, F>(output: &str, header: &Regex, item: &Regex, extract: F) -> Vec<T>
where
    F: Fn(Option<&Captures<'_>>, &Captures<'_>) -> Option<T>,
{
    let mut current: Option<Captures<'_>> = None;
    let mut values = Vec::new();

    for line in lines(output) {
        if let Some(caps) = header.captures(line) {
            current = Some(caps);
            continue;
        }
        if let Some(caps) = item.captures(line) {
            if let Some(value) = extract(current.as_ref(), &caps) {
                values.push(value);
            }
        }
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RUNNING: &str = "\
interface Loopback0\r
 description mgmt loop\r
 ip address 10.0.0.1 255.255.255.255\r
!\r
interface GigabitEthernet0/1\r
 mtu 9000\r
 shutdown\r
!\r
router bgp 65000\r
 bgp router-id 10.0.0.1\r
";

    static IFC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^interface (?<name>\S+)$").unwrap());
    static MTU: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*mtu (?<mtu>\d+)$").unwrap());

    #[test]
    fn test_parse_field() {
        let mtu: Option<u16> = parse_field(RUNNING, &MTU, |c| c["mtu"].parse().ok());
        assert_eq!(mtu, Some(9000));

        let none: Option<u8> = parse_field(RUNNING, &MTU, |c| c["mtu"].parse().ok());
        assert_eq!(none, None, "9000 does not fit u8, field stays unset");
    }

    #[test]
    fn test_parse_fields_and_keys() {
        let names = parse_fields(RUNNING, &IFC, |c| Some(c["name"].to_string()));
        assert_eq!(names, vec!["Loopback0", "GigabitEthernet0/1"]);

        let keys = parse_keys("b\na\nb\n", &Regex::new(r"^(?<k>\w)$").unwrap(), |c| {
            Some(c["k"].to_string())
        });
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_contains_line() {
        let shutdown = Regex::new(r"^\s*shutdown$").unwrap();
        assert!(contains_line(RUNNING, &shutdown));
        assert!(!contains_line("interface Loopback0\n", &shutdown));
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"to core \\\"A\\\"\""), "to core \"A\"");
        assert_eq!(unquote("\"uplink\""), "uplink");
        assert_eq!(unquote("uplink"), "uplink");
    }

    #[test]
    fn test_split_sections() {
        let sections = split_sections(RUNNING, &IFC);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].header, "interface Loopback0");
        assert_eq!(
            sections[0].body,
            vec![" description mgmt loop", " ip address 10.0.0.1 255.255.255.255"]
        );
        assert_eq!(sections[1].body_text(), " mtu 9000\n shutdown");
    }

    #[test]
    fn test_find_section() {
        let section = find_section(RUNNING, &IFC, "name", "GigabitEthernet0/1").unwrap();
        assert_eq!(section.body, vec![" mtu 9000", " shutdown"]);
        assert!(find_section(RUNNING, &IFC, "name", "Tunnel1").is_none());
    }

    #[test]
    fn test_parse_under_header() {
        let output = "\
router bgp 1
 neighbor 1.1.1.1 remote-as 1
 address-family ipv4 vrf BLUE
  neighbor 2.2.2.2 remote-as 2
 address-family ipv4 vrf RED
  neighbor 3.3.3.3 remote-as 3
";
        let header = Regex::new(r"^\s*address-family ipv4 vrf (?<vrf>\S+)$").unwrap();
        let item = Regex::new(r"^\s*neighbor (?<ip>\S+) remote-as").unwrap();

        let pairs = parse_under_header(output, &header, &item, |h, c| {
            let vrf = h.map(|h| h["vrf"].to_string()).unwrap_or_else(|| "default".into());
            Some((vrf, c["ip"].to_string()))
        });

        assert_eq!(
            pairs,
            vec![
                ("default".to_string(), "1.1.1.1".to_string()),
                ("BLUE".to_string(), "2.2.2.2".to_string()),
                ("RED".to_string(), "3.3.3.3".to_string()),
            ]
        );
    }
}

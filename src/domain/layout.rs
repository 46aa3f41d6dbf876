//! Deterministic grid layout of a partlist as a placeable model.
//!
//! Used only for partlist-mode output: every part type gets a column, every
//! colour gets a row, and multiple units of the same part stack upwards.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{Document, PartKey, Partlist, Statement, Submodel};

/// Grid spacing for the rendered partlist, in LDraw units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spacing {
    /// Distance between part-type columns (20 ldu = 1 stud).
    pub column: u32,
    /// Distance between colour rows.
    pub row: u32,
    /// Vertical distance between stacked units of the same part and colour
    /// (24 ldu = 1 brick).
    pub height: u32,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            column: 165,
            row: 165,
            height: 35,
        }
    }
}

/// The first run of digits in a part filename.
static PART_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("this must never fail"));

/// The numeric part number embedded in a part filename, or -1 if the stem
/// contains no digits. `3001.dat` → 3001, `54200s01.dat` → 54200.
fn part_number(part: &str) -> i64 {
    let stem = part.strip_suffix(".dat").unwrap_or(part);
    PART_NUMBER
        .find(stem)
        .and_then(|digits| digits.as_str().parse().ok())
        .unwrap_or(-1)
}

/// The colour id interpreted as an integer, or -1 if non-numeric.
fn colour_number(colour: &str) -> i64 {
    colour.parse().unwrap_or(-1)
}

/// The signed grid index a value was assigned in its ordering table.
fn grid_index(table: &[&str], value: &str) -> i64 {
    let index = table
        .iter()
        .position(|entry| *entry == value)
        .expect("every partlist key was assigned a grid index");
    i64::try_from(index).expect("this must never fail")
}

/// Lays a partlist out on a deterministic grid and wraps it as a
/// single-submodel document named `filename`.
///
/// Column indices are assigned to distinct part filenames in ascending
/// part-number order; row indices are assigned to distinct colour ids in
/// ascending numeric order (an independent second ordering pass). Each key
/// with count n emits n placement statements stacked along the negative y
/// axis, identity orientation. The synthesized header carries the literal
/// total part count.
#[must_use]
pub fn render_partlist(partlist: &Partlist, filename: &str, spacing: &Spacing) -> Document {
    let mut keys: Vec<&PartKey> = partlist.iter().map(|(key, _)| key).collect();

    keys.sort_by_key(|key| part_number(key.part()));
    let mut columns: Vec<&str> = Vec::new();
    for key in &keys {
        if !columns.contains(&key.part()) {
            columns.push(key.part());
        }
    }

    keys.sort_by_key(|key| colour_number(key.colour()));
    let mut rows: Vec<&str> = Vec::new();
    for key in &keys {
        if !rows.contains(&key.colour()) {
            rows.push(key.colour());
        }
    }

    let mut submodel = Submodel::new(filename);
    for line in [
        "0 Untitled Model".to_string(),
        format!("0 Name:  {filename}"),
        "0 Author: ".to_string(),
        "0 CustomBrick".to_string(),
        "0 FlexibleBrickControlPointUnitLength -1".to_string(),
        format!("0 NumOfBricks:  {}", partlist.total()),
    ] {
        submodel.push_header_line(line);
    }

    for (key, count) in partlist.iter() {
        let column = grid_index(&columns, key.part());
        let row = grid_index(&rows, key.colour());
        let x = column * i64::from(spacing.column);
        let z = row * i64::from(spacing.row);
        let count = i64::try_from(count).expect("this must never fail");
        for stack in 0..count {
            let y = -stack * i64::from(spacing.height);
            let raw = format!(
                "1 {} {x} {y} {z} 1 0 0 0 1 0 0 0 1 {}",
                key.colour(),
                key.part()
            );
            submodel.push_statement(Statement::Part {
                key: key.clone(),
                raw,
            });
        }
    }

    let mut document = Document::new();
    document.insert(submodel);
    document
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn partlist(entries: &[(&str, usize)]) -> Partlist {
        entries
            .iter()
            .map(|(key, count)| (key.parse::<PartKey>().unwrap(), *count))
            .collect()
    }

    #[test_case("3001.dat", 3001; "plain part number")]
    #[test_case("54200s01.dat", 54200; "digits stop at first letter")]
    #[test_case("u9058.dat", 9058; "leading letters skipped")]
    #[test_case("nodigits.dat", -1; "no digits")]
    fn part_number_extraction(part: &str, expected: i64) {
        assert_eq!(part_number(part), expected);
    }

    #[test_case("4", 4)]
    #[test_case("256", 256)]
    #[test_case("0x2995220", -1; "non numeric colour")]
    fn colour_number_extraction(colour: &str, expected: i64) {
        assert_eq!(colour_number(colour), expected);
    }

    #[test]
    fn emits_one_statement_per_unit() {
        let partlist = partlist(&[("4:3001.dat", 3), ("1:3002.dat", 1)]);
        let document = render_partlist(&partlist, "partlist.ldr", &Spacing::default());
        let root = document.root().unwrap();
        assert_eq!(root.statements().len(), 4);
        assert_eq!(root.parts(), &partlist);
    }

    #[test]
    fn coordinates_are_spacing_multiples() {
        let partlist = partlist(&[("4:3001.dat", 2), ("1:3002.dat", 1), ("4:3002.dat", 1)]);
        let spacing = Spacing {
            column: 100,
            row: 50,
            height: 10,
        };
        let document = render_partlist(&partlist, "partlist.ldr", &spacing);
        for statement in document.root().unwrap().statements() {
            let fields: Vec<&str> = statement.raw().split(' ').collect();
            let x: i64 = fields[2].parse().unwrap();
            let y: i64 = fields[3].parse().unwrap();
            let z: i64 = fields[4].parse().unwrap();
            assert_eq!(x % 100, 0);
            assert_eq!(y % 10, 0);
            assert!(y <= 0);
            assert_eq!(z % 50, 0);
        }
    }

    #[test]
    fn columns_follow_part_number_order() {
        // 3002 sorts after 3001, so it lands one column further out.
        let partlist = partlist(&[("4:3002.dat", 1), ("4:3001.dat", 1)]);
        let spacing = Spacing::default();
        let document = render_partlist(&partlist, "partlist.ldr", &spacing);
        let root = document.root().unwrap();
        for statement in root.statements() {
            let fields: Vec<&str> = statement.raw().split(' ').collect();
            let x: i64 = fields[2].parse().unwrap();
            if statement.raw().ends_with("3001.dat") {
                assert_eq!(x, 0);
            } else {
                assert_eq!(x, i64::from(spacing.column));
            }
        }
    }

    #[test]
    fn rows_follow_colour_order() {
        let partlist = partlist(&[("15:3001.dat", 1), ("4:3001.dat", 1)]);
        let spacing = Spacing::default();
        let document = render_partlist(&partlist, "partlist.ldr", &spacing);
        for statement in document.root().unwrap().statements() {
            let fields: Vec<&str> = statement.raw().split(' ').collect();
            let z: i64 = fields[4].parse().unwrap();
            if fields[1] == "4" {
                assert_eq!(z, 0);
            } else {
                assert_eq!(z, i64::from(spacing.row));
            }
        }
    }

    #[test]
    fn stacked_placements_use_exact_grid_coordinates() {
        let partlist = partlist(&[("4:3001.dat", 3), ("1:3002.dat", 1)]);
        let spacing = Spacing {
            column: 165,
            row: 165,
            height: 35,
        };
        let document = render_partlist(&partlist, "partlist.ldr", &spacing);
        let lines: Vec<&str> = document
            .root()
            .unwrap()
            .statements()
            .iter()
            .map(Statement::raw)
            .collect();
        // Colour 1 takes row 0 and colour 4 row 1; part 3001 takes column 0
        // and 3002 column 1; the repeated key stacks along negative y.
        assert_eq!(
            lines,
            [
                "1 1 165 0 0 1 0 0 0 1 0 0 0 1 3002.dat",
                "1 4 0 0 165 1 0 0 0 1 0 0 0 1 3001.dat",
                "1 4 0 -35 165 1 0 0 0 1 0 0 0 1 3001.dat",
                "1 4 0 -70 165 1 0 0 0 1 0 0 0 1 3001.dat",
            ]
        );
    }

    #[test]
    fn header_carries_total_count() {
        let partlist = partlist(&[("4:3001.dat", 2), ("1:3002.dat", 1)]);
        let document = render_partlist(&partlist, "partlist.ldr", &Spacing::default());
        let root = document.root().unwrap();
        assert!(root
            .header()
            .iter()
            .any(|line| line == "0 NumOfBricks:  3"));
        assert_eq!(root.filename(), "partlist.ldr");
    }

    #[test]
    fn empty_partlist_renders_header_only() {
        let document = render_partlist(&Partlist::new(), "empty.ldr", &Spacing::default());
        assert!(document.root().unwrap().statements().is_empty());
    }
}

//! Three-stage pipeline decoding the solver's HTML statistics report.
//!
//! 1. **Sectioning** — headings are matched by normalized text, never by
//!    byte offsets, because generated reports vary in surrounding markup.
//! 2. **Row decoding** — cells become numbers, `min-max` ranges, or null
//!    placeholders; an ellipsis row ends a section and flags the report
//!    as partial.
//! 3. **Assembly** — rows are grouped into year-level / group / subgroup
//!    sequences in document order, which mirrors the solver's own
//!    grouping.
//!
//! Malformed rows and optional sections degrade to warnings; only the
//! metadata and overall sections are load-bearing and abort the parse
//! when absent.

use crate::models::report::{
    Bounds, GroupRow, OverallStats, ReportMetadata, StatisticsReport, SubgroupRow, YearLevelRow,
};
use crate::parsing::cells::{is_truncation_marker, parse_cell, parse_scalar_cell};
use crate::parsing::html::{self, Fragment};
use chrono::NaiveDateTime;
use thiserror::Error;

/// The report sections this parser understands.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Section {
    Metadata,
    Overall,
    YearLevels,
    Groups,
    Subgroups,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Section::Metadata => "metadata",
            Section::Overall => "overall",
            Section::YearLevels => "year levels",
            Section::Groups => "groups",
            Section::Subgroups => "subgroups",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("required section '{0}' is missing from the report")]
    MissingRequiredSection(Section),
}

/// Non-fatal findings collected during a parse and returned alongside
/// the best-effort report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseWarning {
    #[error("section '{section}' has an unrecognized layout: {detail}")]
    MalformedSectionHeader { section: Section, detail: String },

    #[error("section '{section}', row '{row}': unparsable cell '{cell}'")]
    UnparsableNumericCell {
        section: Section,
        row: String,
        cell: String,
    },
}

/// Parse a generated statistics report.
///
/// Never raises on malformed rows or optional sections; fails only when
/// the metadata or overall section cannot be recovered.
pub fn parse(html_text: &str) -> Result<(StatisticsReport, Vec<ParseWarning>), ParseError> {
    let fragments = html::fragments(html_text);

    let mut warnings = Vec::new();
    let mut partial = false;

    let mut institution: Option<String> = None;
    let mut generated_with: Option<String> = None;
    let mut generated_at: Option<NaiveDateTime> = None;

    let mut overall: Option<OverallStats> = None;
    let mut year_levels: Option<Vec<YearLevelRow>> = None;
    let mut groups: Option<Vec<GroupRow>> = None;
    let mut subgroups: Option<Vec<SubgroupRow>> = None;

    let mut pending: Option<Section> = None;
    let mut seen_section = false;

    for fragment in &fragments {
        match fragment {
            Fragment::Heading(text) => {
                let Some(section) = section_for(text) else {
                    continue;
                };
                if let Some(dangling) = pending.take() {
                    warnings.push(ParseWarning::MalformedSectionHeader {
                        section: dangling,
                        detail: "no table follows the section heading".to_string(),
                    });
                    partial = true;
                }
                seen_section = true;
                pending = Some(section);
            }
            Fragment::Paragraph(text) => {
                // Metadata lives in key/value paragraphs ahead of the
                // first recognized section heading.
                if seen_section {
                    continue;
                }
                let Some((key, value)) = text.split_once(':') else {
                    continue;
                };
                let key = key.trim().to_lowercase();
                let value = value.trim();
                if value.is_empty() {
                    continue;
                }
                if key.contains("institution") {
                    institution.get_or_insert_with(|| value.to_string());
                } else if key.contains("generated with") || key.contains("generated by") {
                    generated_with.get_or_insert_with(|| value.to_string());
                } else if key.contains("generated at") || key.contains("generated on") {
                    if generated_at.is_none() {
                        generated_at = parse_timestamp(value);
                    }
                }
            }
            Fragment::Table(rows) => {
                let Some(section) = pending.take() else {
                    // A table with no recognized heading is not ours.
                    continue;
                };
                match section {
                    Section::Overall if overall.is_none() => {
                        overall = decode_overall(rows, &mut warnings, &mut partial);
                    }
                    Section::YearLevels if year_levels.is_none() => {
                        let decoded =
                            decode_breakdown(section, "year", rows, &mut warnings, &mut partial);
                        year_levels = Some(
                            decoded
                                .into_iter()
                                .map(|(year, hours, gaps)| YearLevelRow {
                                    year,
                                    hours_per_week: hours,
                                    gaps_per_week: gaps,
                                })
                                .collect(),
                        );
                    }
                    Section::Groups if groups.is_none() => {
                        let decoded =
                            decode_breakdown(section, "group", rows, &mut warnings, &mut partial);
                        groups = Some(
                            decoded
                                .into_iter()
                                .map(|(group, hours, gaps)| GroupRow {
                                    group,
                                    hours_per_week: hours,
                                    gaps_per_week: gaps,
                                })
                                .collect(),
                        );
                    }
                    Section::Subgroups if subgroups.is_none() => {
                        subgroups = Some(decode_subgroups(rows, &mut warnings, &mut partial));
                    }
                    // Duplicate sections: first one wins.
                    _ => log::debug!("ignoring duplicate '{section}' section"),
                }
            }
        }
    }

    if let Some(dangling) = pending.take() {
        warnings.push(ParseWarning::MalformedSectionHeader {
            section: dangling,
            detail: "no table follows the section heading".to_string(),
        });
        partial = true;
    }

    let institution_name = institution
        .ok_or(ParseError::MissingRequiredSection(Section::Metadata))?;
    let overall = overall.ok_or(ParseError::MissingRequiredSection(Section::Overall))?;

    log::debug!(
        "parsed report for '{institution_name}': {} year levels, {} groups, {} subgroups, \
         {} warning(s), partial = {partial}",
        year_levels.as_ref().map_or(0, Vec::len),
        groups.as_ref().map_or(0, Vec::len),
        subgroups.as_ref().map_or(0, Vec::len),
        warnings.len()
    );

    Ok((
        StatisticsReport {
            metadata: ReportMetadata {
                institution_name,
                generated_with,
                generated_at,
            },
            overall,
            year_levels: year_levels.unwrap_or_default(),
            groups: groups.unwrap_or_default(),
            subgroups: subgroups.unwrap_or_default(),
            partial,
        },
        warnings,
    ))
}

fn section_for(heading: &str) -> Option<Section> {
    let lowered = heading.to_lowercase();
    if lowered.contains("overall") {
        Some(Section::Overall)
    } else if lowered.contains("subgroup") {
        Some(Section::Subgroups)
    } else if lowered.contains("group") {
        Some(Section::Groups)
    } else if lowered.contains("year") {
        Some(Section::YearLevels)
    } else {
        None
    }
}

/// Timestamp formats observed across generator versions.
fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%d.%m.%Y %H:%M",
        "%d/%m/%Y %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

fn decode_overall(
    rows: &[Vec<String>],
    warnings: &mut Vec<ParseWarning>,
    partial: &mut bool,
) -> Option<OverallStats> {
    let header = rows.first()?;
    let position = |name: &str| {
        header
            .iter()
            .position(|cell| cell.to_lowercase().contains(name))
    };
    let (Some(sum_i), Some(avg_i), Some(min_i), Some(max_i)) = (
        position("sum"),
        position("average"),
        position("min"),
        position("max"),
    ) else {
        warnings.push(ParseWarning::MalformedSectionHeader {
            section: Section::Overall,
            detail: format!(
                "expected sum/average/min/max columns, found '{}'",
                header.join(", ")
            ),
        });
        *partial = true;
        return None;
    };

    for row in &rows[1..] {
        if is_truncation_marker(row) {
            *partial = true;
            break;
        }
        let mut values = [0.0; 4];
        let mut usable = true;
        for (slot, &index) in values.iter_mut().zip([sum_i, avg_i, min_i, max_i].iter()) {
            let text = row.get(index).map(String::as_str).unwrap_or("");
            match parse_scalar_cell(text) {
                Ok(Some(value)) => *slot = value,
                Ok(None) => usable = false,
                Err(err) => {
                    warnings.push(ParseWarning::UnparsableNumericCell {
                        section: Section::Overall,
                        row: row.first().cloned().unwrap_or_default(),
                        cell: err.text,
                    });
                    usable = false;
                }
            }
        }
        if usable {
            return Some(OverallStats {
                sum: values[0],
                average: values[1],
                min: values[2],
                max: values[3],
            });
        }
    }
    None
}

type BreakdownRow = (String, Option<Bounds>, Option<Bounds>);

fn breakdown_header_matches(header: &[String], label_keyword: &str) -> bool {
    header.len() >= 3
        && header[0].to_lowercase().contains(label_keyword)
        && header[1].to_lowercase().contains("hours")
        && header[2].to_lowercase().contains("gaps")
}

/// Decode a `label | hours per week | gaps per week` table body shared by
/// the year-level and group sections.
fn decode_breakdown(
    section: Section,
    label_keyword: &str,
    rows: &[Vec<String>],
    warnings: &mut Vec<ParseWarning>,
    partial: &mut bool,
) -> Vec<BreakdownRow> {
    let Some(header) = rows.first() else {
        return Vec::new();
    };
    if !breakdown_header_matches(header, label_keyword) {
        warnings.push(ParseWarning::MalformedSectionHeader {
            section,
            detail: format!(
                "expected {label_keyword}/hours/gaps columns, found '{}'",
                header.join(", ")
            ),
        });
        *partial = true;
        return Vec::new();
    }

    let mut decoded = Vec::new();
    for row in &rows[1..] {
        if is_truncation_marker(row) {
            *partial = true;
            break;
        }
        let label = row[0].clone();
        if label.is_empty() || row.len() < 3 {
            warnings.push(ParseWarning::UnparsableNumericCell {
                section,
                row: label,
                cell: String::new(),
            });
            continue;
        }
        let hours = match parse_cell(&row[1]) {
            Ok(value) => value,
            Err(err) => {
                warnings.push(ParseWarning::UnparsableNumericCell {
                    section,
                    row: label,
                    cell: err.text,
                });
                continue;
            }
        };
        let gaps = match parse_cell(&row[2]) {
            Ok(value) => value,
            Err(err) => {
                warnings.push(ParseWarning::UnparsableNumericCell {
                    section,
                    row: label,
                    cell: err.text,
                });
                continue;
            }
        };
        decoded.push((label, hours, gaps));
    }
    decoded
}

fn decode_subgroups(
    rows: &[Vec<String>],
    warnings: &mut Vec<ParseWarning>,
    partial: &mut bool,
) -> Vec<SubgroupRow> {
    let Some(header) = rows.first() else {
        return Vec::new();
    };
    if !breakdown_header_matches(header, "subgroup") {
        warnings.push(ParseWarning::MalformedSectionHeader {
            section: Section::Subgroups,
            detail: format!(
                "expected subgroup/hours/gaps columns, found '{}'",
                header.join(", ")
            ),
        });
        *partial = true;
        return Vec::new();
    }

    let mut decoded = Vec::new();
    for row in &rows[1..] {
        if is_truncation_marker(row) {
            *partial = true;
            break;
        }
        let label = row[0].clone();
        if label.is_empty() || row.len() < 3 {
            warnings.push(ParseWarning::UnparsableNumericCell {
                section: Section::Subgroups,
                row: label,
                cell: String::new(),
            });
            continue;
        }
        let hours = match parse_scalar_cell(&row[1]) {
            Ok(value) => value,
            Err(err) => {
                warnings.push(ParseWarning::UnparsableNumericCell {
                    section: Section::Subgroups,
                    row: label,
                    cell: err.text,
                });
                continue;
            }
        };
        let total_gaps = match parse_scalar_cell(&row[2]) {
            Ok(value) => value,
            Err(err) => {
                warnings.push(ParseWarning::UnparsableNumericCell {
                    section: Section::Subgroups,
                    row: label,
                    cell: err.text,
                });
                continue;
            }
        };
        decoded.push(SubgroupRow {
            subgroup: label,
            hours_per_week: hours,
            total_gaps,
        });
    }
    decoded
}

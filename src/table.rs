use crate::record::Observation;
use std::cmp::Ordering;
use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

pub const MAX_VISIBLE_ROWS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    Rarity,
    Notes,
    Timestamp,
}

impl SortColumn {
    fn compare(&self, a: &Observation, b: &Observation) -> Ordering {
        match self {
            SortColumn::Name => a.name.cmp(&b.name),
            SortColumn::Rarity => a.rarity.label().cmp(b.rarity.label()),
            SortColumn::Notes => a.notes.cmp(&b.notes),
            SortColumn::Timestamp => a.timestamp.cmp(&b.timestamp),
        }
    }

    fn header(&self) -> &'static str {
        match self {
            SortColumn::Name => "name",
            SortColumn::Rarity => "rarity",
            SortColumn::Notes => "notes",
            SortColumn::Timestamp => "timestamp",
        }
    }
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(SortColumn::Name),
            "rarity" => Ok(SortColumn::Rarity),
            "notes" => Ok(SortColumn::Notes),
            "timestamp" | "time" | "date" => Ok(SortColumn::Timestamp),
            other => Err(format!(
                "unknown column '{}', expected one of: name, rarity, notes, timestamp",
                other
            )),
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "^",
            SortDirection::Descending => "v",
        }
    }
}

/// Which column the table is ordered by. `None` shows server order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    active: Option<(SortColumn, SortDirection)>,
}

impl SortState {
    pub fn by(column: SortColumn, direction: SortDirection) -> Self {
        Self {
            active: Some((column, direction)),
        }
    }

    /// Same column flips direction, a new column starts ascending.
    pub fn select(&mut self, column: SortColumn) {
        self.active = Some(match self.active {
            Some((current, direction)) if current == column => (column, direction.toggled()),
            _ => (column, SortDirection::Ascending),
        });
    }

    pub fn active(&self) -> Option<(SortColumn, SortDirection)> {
        self.active
    }

    pub fn apply<'a>(&self, records: &'a [Observation]) -> Vec<&'a Observation> {
        match self.active {
            Some((column, direction)) => sort(records, column, direction),
            None => records.iter().collect(),
        }
    }
}

/// Stable sort by one column; equal keys keep their list order in both directions.
pub fn sort(
    records: &[Observation],
    column: SortColumn,
    direction: SortDirection,
) -> Vec<&Observation> {
    let mut ordered: Vec<&Observation> = records.iter().collect();
    ordered.sort_by(|a, b| match direction {
        SortDirection::Ascending => column.compare(a, b),
        SortDirection::Descending => column.compare(b, a),
    });
    ordered
}

/// The rendered slice of the ordering plus the full count for the caption.
pub struct TableView<'a> {
    pub rows: Vec<&'a Observation>,
    pub total: usize,
    pub sort: SortState,
}

impl<'a> TableView<'a> {
    pub fn new(records: &'a [Observation], sort: SortState) -> Self {
        let mut rows = sort.apply(records);
        rows.truncate(MAX_VISIBLE_ROWS);
        Self {
            rows,
            total: records.len(),
            sort,
        }
    }

    pub fn caption(&self) -> String {
        format!("showing {} of {}", self.rows.len(), self.total)
    }

    fn header_cell(&self, column: SortColumn) -> String {
        match self.sort.active() {
            Some((active, direction)) if active == column => {
                format!("{} {}", column.header(), direction.arrow())
            }
            _ => column.header().to_string(),
        }
    }

    pub fn render(&self) -> String {
        let columns = [
            SortColumn::Name,
            SortColumn::Rarity,
            SortColumn::Notes,
            SortColumn::Timestamp,
        ];

        let cells: Vec<[String; 5]> = self
            .rows
            .iter()
            .map(|r| {
                [
                    r.id.to_string(),
                    r.name.clone(),
                    r.rarity.to_string(),
                    r.notes.replace('\n', " "),
                    r.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                ]
            })
            .collect();

        let header: [String; 5] = [
            "id".to_string(),
            self.header_cell(columns[0]),
            self.header_cell(columns[1]),
            self.header_cell(columns[2]),
            self.header_cell(columns[3]),
        ];

        let mut widths = header.clone().map(|h| h.chars().count());
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        write_row(&mut out, &header, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_row(&mut out, &rule, &widths);
        for row in &cells {
            write_row(&mut out, row, &widths);
        }
        out.push_str(&self.caption());
        out
    }
}

fn write_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

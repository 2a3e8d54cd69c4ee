use crate::data::datetime::{date_to_plot_x, format_date};
use crate::processing::aggregation::DailyAggregate;
use crate::state::app_state::SortDirection;
use crate::state::measurement::{Measurement, Statistic};
use crate::state::style::{color32, StyleConfig};

/// Column 0 is the date; the rest follow the CSV column order.
fn columns() -> Vec<(Measurement, Statistic)> {
    Measurement::ALL
        .iter()
        .flat_map(|&m| Statistic::ALL.iter().map(move |&s| (m, s)))
        .collect()
}

pub fn cycle_sort(
    current: Option<(usize, SortDirection)>,
    col: usize,
) -> Option<(usize, SortDirection)> {
    match current {
        Some((c, SortDirection::Ascending)) if c == col => Some((col, SortDirection::Descending)),
        Some((c, SortDirection::Descending)) if c == col => None,
        _ => Some((col, SortDirection::Ascending)),
    }
}

fn table_value(row: &DailyAggregate, col: usize) -> f64 {
    if col == 0 {
        return date_to_plot_x(row.date);
    }
    let idx = col - 1;
    let n_stats = Statistic::ALL.len();
    Measurement::ALL
        .get(idx / n_stats)
        .and_then(|&m| row.get(m))
        .map(|s| s.get(Statistic::ALL[idx % n_stats]))
        .unwrap_or(f64::NAN)
}

/// Row order for the given sort state.
pub fn sorted_rows(table: &[DailyAggregate], sort: Option<(usize, SortDirection)>) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..table.len()).collect();
    if let Some((col, dir)) = sort {
        indices.sort_by(|&a, &b| {
            let cmp = table_value(&table[a], col).total_cmp(&table_value(&table[b], col));
            match dir {
                SortDirection::Ascending => cmp,
                SortDirection::Descending => cmp.reverse(),
            }
        });
    }
    indices
}

/// Sortable grid of the daily statistics, headers tinted with each
/// statistic's colour.
pub fn show_table_view(
    ui: &mut egui::Ui,
    table: &[DailyAggregate],
    style: &StyleConfig,
    sort: &mut Option<(usize, SortDirection)>,
) {
    if table.is_empty() {
        ui.label("No data.");
        return;
    }

    use egui_extras::{Column, TableBuilder};

    let cols = columns();
    let order = sorted_rows(table, *sort);
    let current_sort = *sort;
    let clicked_col: std::cell::Cell<Option<usize>> = std::cell::Cell::new(None);

    let arrow = |col: usize| match current_sort {
        Some((c, SortDirection::Ascending)) if c == col => " ^",
        Some((c, SortDirection::Descending)) if c == col => " v",
        _ => "",
    };

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::auto().at_least(100.0))
        .columns(Column::auto().at_least(80.0), cols.len())
        .min_scrolled_height(300.0)
        .header(20.0, |mut header| {
            header.col(|ui| {
                if ui.button(format!("date{}", arrow(0))).clicked() {
                    clicked_col.set(Some(0));
                }
            });
            for (i, (m, stat)) in cols.iter().enumerate() {
                header.col(|ui| {
                    let label = format!("{} {}{}", m.name(), stat.name(), arrow(i + 1));
                    let color = color32(style.get(*m).colors.get(*stat));
                    if ui.button(egui::RichText::new(label).color(color)).clicked() {
                        clicked_col.set(Some(i + 1));
                    }
                });
            }
        })
        .body(|body| {
            body.rows(18.0, order.len(), |mut row| {
                let agg = &table[order[row.index()]];
                row.col(|ui| {
                    ui.label(format_date(agg.date));
                });
                for &(m, stat) in &cols {
                    row.col(|ui| match agg.get(m) {
                        Some(s) => {
                            ui.label(format!("{:.3}", s.get(stat)));
                        }
                        None => {
                            ui.label("-");
                        }
                    });
                }
            });
        });

    if let Some(col) = clicked_col.get() {
        *sort = cycle_sort(*sort, col);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::statistics::DailyStats;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn row(day: u32, co2_values: &[f64]) -> DailyAggregate {
        DailyAggregate {
            date: NaiveDate::from_ymd_opt(2021, 6, day).unwrap(),
            stats: BTreeMap::from([(Measurement::Co2, DailyStats::compute(co2_values).unwrap())]),
        }
    }

    #[test]
    fn sort_cycles_through_directions() {
        let s = cycle_sort(None, 2);
        assert_eq!(s, Some((2, SortDirection::Ascending)));
        let s = cycle_sort(s, 2);
        assert_eq!(s, Some((2, SortDirection::Descending)));
        assert_eq!(cycle_sort(s, 2), None);
        assert_eq!(cycle_sort(s, 3), Some((3, SortDirection::Ascending)));
    }

    #[test]
    fn rows_sort_by_statistic() {
        let table = vec![row(1, &[5.0]), row(2, &[1.0]), row(3, &[3.0])];
        assert_eq!(sorted_rows(&table, None), vec![0, 1, 2]);
        // Column 1 is CO2 mean.
        assert_eq!(sorted_rows(&table, Some((1, SortDirection::Ascending))), vec![1, 2, 0]);
        assert_eq!(sorted_rows(&table, Some((1, SortDirection::Descending))), vec![0, 2, 1]);
        assert_eq!(sorted_rows(&table, Some((0, SortDirection::Descending))), vec![2, 1, 0]);
    }
}

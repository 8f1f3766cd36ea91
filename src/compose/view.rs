//! View Module
//! Declarative view descriptors and their render-time evaluation. A view
//! never mutates the dataset; it re-evaluates its filter predicates against
//! the current selection values on every render and derives the mark data
//! (bars, points, histogram buckets) from the surviving rows.

use crate::compose::bin::{BinConfig, BinParams};
use crate::compose::selection::SessionState;
use crate::compose::ComposeError;
use crate::data;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Mark kind. Histograms are bar marks with a binned encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    Bar,
    Circle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregate {
    Mean,
    Count,
}

/// Ordering rule for a categorical axis: sort by an aggregate of another
/// field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub op: Aggregate,
}

/// One field-to-channel encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encoding {
    pub field: String,
    #[serde(default)]
    pub aggregate: Option<Aggregate>,
    #[serde(default)]
    pub bin: Option<BinConfig>,
    /// Fixed scale domain for numeric axes.
    #[serde(default)]
    pub domain: Option<[f64; 2]>,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    #[serde(default)]
    pub title: Option<String>,
}

impl Encoding {
    pub fn field(name: &str) -> Self {
        Self {
            field: name.to_string(),
            aggregate: None,
            bin: None,
            domain: None,
            sort: None,
            title: None,
        }
    }

    /// A count-of-rows axis with no backing field.
    pub fn count() -> Self {
        let mut e = Self::field("");
        e.aggregate = Some(Aggregate::Count);
        e
    }

    pub fn mean(mut self) -> Self {
        self.aggregate = Some(Aggregate::Mean);
        self
    }

    pub fn binned(mut self, bin: BinConfig) -> Self {
        self.bin = Some(bin);
        self
    }

    pub fn domain(mut self, domain: [f64; 2]) -> Self {
        self.domain = Some(domain);
        self
    }

    pub fn sorted_by_mean(mut self, field: &str) -> Self {
        self.sort = Some(SortSpec {
            field: field.to_string(),
            op: Aggregate::Mean,
        });
        self
    }

    pub fn titled(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Axis label: explicit title, or the field name.
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.field)
    }
}

fn default_dim() -> f32 {
    250.0
}

/// Declarative description of one chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewSpec {
    pub name: String,
    pub mark: Mark,
    pub x: Encoding,
    pub y: Encoding,
    /// Field driving per-category color.
    #[serde(default)]
    pub color: Option<String>,
    /// Fields surfaced in the hover readout.
    #[serde(default)]
    pub tooltip: Vec<String>,
    /// Columns folded into long form before any filtering.
    #[serde(default)]
    pub fold: Option<Vec<String>>,
    /// Selection names used as filter predicates, combined with AND.
    #[serde(default)]
    pub filters: Vec<String>,
    #[serde(default = "default_dim")]
    pub width: f32,
    #[serde(default = "default_dim")]
    pub height: f32,
}

impl ViewSpec {
    pub fn new(name: &str, mark: Mark, x: Encoding, y: Encoding) -> Self {
        Self {
            name: name.to_string(),
            mark,
            x,
            y,
            color: None,
            tooltip: Vec::new(),
            fold: None,
            filters: Vec::new(),
            width: default_dim(),
            height: default_dim(),
        }
    }

    pub fn color(mut self, field: &str) -> Self {
        self.color = Some(field.to_string());
        self
    }

    pub fn tooltip(mut self, fields: &[&str]) -> Self {
        self.tooltip = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn fold(mut self, columns: &[String]) -> Self {
        self.fold = Some(columns.to_vec());
        self
    }

    pub fn filters(mut self, selections: &[&str]) -> Self {
        self.filters = selections.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// Mean and count per category label, in axis order.
#[derive(Debug, Clone, PartialEq)]
pub struct BarData {
    pub labels: Vec<String>,
    pub means: Vec<f64>,
    pub counts: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub tooltip: String,
}

/// One colored point series.
#[derive(Debug, Clone)]
pub struct ScatterSeries {
    pub label: String,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone)]
pub struct HistSeries {
    pub label: String,
    pub counts: Vec<usize>,
}

/// Shared bin parameters plus per-series bucket counts.
#[derive(Debug, Clone)]
pub struct HistogramData {
    pub params: BinParams,
    pub series: Vec<HistSeries>,
}

/// A composed view: the descriptor plus its base frame (folded when the
/// descriptor asks for it). The base is immutable; filtering happens on a
/// lazy clone per render.
#[derive(Debug)]
pub struct View {
    pub spec: ViewSpec,
    base: DataFrame,
    /// Color series labels fixed from the unfiltered base so palette
    /// assignment is stable under filtering.
    series_labels: Vec<String>,
}

impl View {
    /// Compose a view over `df`, applying the descriptor's fold transform
    /// and validating every referenced field and selection.
    pub fn compose(
        spec: ViewSpec,
        df: &DataFrame,
        session: &SessionState,
    ) -> Result<Self, ComposeError> {
        let base = match &spec.fold {
            Some(columns) => data::fold(df, columns)?,
            None => df.clone(),
        };

        for selection in &spec.filters {
            if !session.contains(selection) {
                return Err(ComposeError::UnknownSelection {
                    view: spec.name.clone(),
                    selection: selection.clone(),
                });
            }
        }

        let mut referenced: Vec<&str> = Vec::new();
        for encoding in [&spec.x, &spec.y] {
            if !encoding.field.is_empty() {
                referenced.push(&encoding.field);
            }
            if let Some(sort) = &encoding.sort {
                referenced.push(&sort.field);
            }
        }
        if let Some(color) = &spec.color {
            referenced.push(color);
        }
        referenced.extend(spec.tooltip.iter().map(String::as_str));

        for field in referenced {
            if !data::loader::has_column(&base, field) {
                return Err(ComposeError::UnknownField {
                    owner: format!("view '{}'", spec.name),
                    field: field.to_string(),
                });
            }
        }

        let series_labels = match &spec.color {
            Some(color) => {
                let mut labels = data::loader::unique_values(&base, color);
                labels.sort();
                labels
            }
            None => Vec::new(),
        };

        Ok(Self {
            spec,
            base,
            series_labels,
        })
    }

    /// Color series labels in palette order (empty when uncolored).
    pub fn series_labels(&self) -> &[String] {
        &self.series_labels
    }

    /// Evaluate the filter predicates against the current selection values.
    /// Unset selections pass the full base through; set selections combine
    /// conjunctively.
    pub fn frame(&self, session: &SessionState) -> Result<DataFrame, ComposeError> {
        let mut lf = self.base.clone().lazy();
        for name in &self.spec.filters {
            let Some(selection) = session.get(name) else {
                continue;
            };
            if let Some(value) = selection.value() {
                lf = lf.filter(col(selection.field.as_str()).eq(lit(value)));
            }
        }
        Ok(lf.collect()?)
    }

    /// Aggregated bar data: the y encoding names the category labels, the x
    /// encoding the mean measure, and the y sort rule the axis order.
    pub fn bar_data(&self, session: &SessionState) -> Result<BarData, ComposeError> {
        let frame = self.frame(session)?;
        if frame.height() == 0 {
            return Ok(BarData {
                labels: Vec::new(),
                means: Vec::new(),
                counts: Vec::new(),
            });
        }

        let label_field = self.spec.y.field.as_str();
        let measure = self.spec.x.field.as_str();
        let order_field = self
            .spec
            .y
            .sort
            .as_ref()
            .map(|s| s.field.as_str())
            .unwrap_or(measure);

        let out = frame
            .lazy()
            .group_by([col(label_field)])
            .agg([
                col(measure)
                    .cast(DataType::Float64)
                    .mean()
                    .alias("__mean"),
                col(order_field)
                    .cast(DataType::Float64)
                    .mean()
                    .alias("__order"),
                col(measure).count().alias("__count"),
            ])
            .sort(["__order"], Default::default())
            .collect()?;

        let labels = column_strings(&out, label_field)?;
        let means = column_floats(&out, "__mean")?;
        let counts = column_floats(&out, "__count")?
            .into_iter()
            .map(|c| c as usize)
            .collect();

        Ok(BarData {
            labels,
            means,
            counts,
        })
    }

    /// Point series for circle marks, grouped by the color field.
    pub fn scatter_data(&self, session: &SessionState) -> Result<Vec<ScatterSeries>, ComposeError> {
        let frame = self.frame(session)?;
        let xs = column_floats(&frame, &self.spec.x.field)?;
        let ys = column_floats(&frame, &self.spec.y.field)?;
        let colors = match &self.spec.color {
            Some(color) => column_strings(&frame, color)?,
            None => vec![String::new(); frame.height()],
        };

        let tooltip_columns: Vec<(String, Vec<String>)> = self
            .spec
            .tooltip
            .iter()
            .map(|field| Ok((field.clone(), column_strings(&frame, field)?)))
            .collect::<Result<_, ComposeError>>()?;

        let labels: Vec<String> = if self.series_labels.is_empty() {
            vec![String::new()]
        } else {
            self.series_labels.clone()
        };

        let mut series: Vec<ScatterSeries> = labels
            .into_iter()
            .map(|label| ScatterSeries {
                label,
                points: Vec::new(),
            })
            .collect();

        for i in 0..frame.height() {
            let (x, y) = (xs[i], ys[i]);
            if x.is_nan() || y.is_nan() {
                continue;
            }
            let Some(slot) = series.iter_mut().find(|s| s.label == colors[i]) else {
                continue;
            };
            let tooltip = tooltip_columns
                .iter()
                .map(|(field, values)| format!("{field}: {}", values[i]))
                .collect::<Vec<_>>()
                .join("\n");
            slot.points.push(ScatterPoint { x, y, tooltip });
        }

        Ok(series)
    }

    /// Histogram buckets for bar marks with a binned encoding. All series
    /// share one set of bin parameters so overlapping bars stay aligned.
    pub fn histogram_data(&self, session: &SessionState) -> Result<HistogramData, ComposeError> {
        let (bin, field) = match (&self.spec.x.bin, &self.spec.y.bin) {
            (Some(bin), _) => (*bin, self.spec.x.field.as_str()),
            (_, Some(bin)) => (*bin, self.spec.y.field.as_str()),
            _ => {
                return Err(ComposeError::UnknownField {
                    owner: format!("view '{}'", self.spec.name),
                    field: "<bin>".to_string(),
                })
            }
        };

        let frame = self.frame(session)?;
        let values = column_floats(&frame, field)?;
        let Some(params) = bin.params(&values) else {
            return Ok(HistogramData {
                params: BinParams {
                    start: 0.0,
                    stop: 1.0,
                    step: 1.0,
                },
                series: Vec::new(),
            });
        };

        let series = if let Some(color) = &self.spec.color {
            let groups = column_strings(&frame, color)?;
            self.series_labels
                .iter()
                .map(|label| {
                    let group_values: Vec<f64> = values
                        .iter()
                        .zip(groups.iter())
                        .filter(|(_, g)| *g == label)
                        .map(|(&v, _)| v)
                        .collect();
                    HistSeries {
                        label: label.clone(),
                        counts: params.histogram(&group_values),
                    }
                })
                .collect()
        } else {
            vec![HistSeries {
                label: String::new(),
                counts: params.histogram(&values),
            }]
        };

        Ok(HistogramData { params, series })
    }
}

fn column_floats(frame: &DataFrame, field: &str) -> Result<Vec<f64>, ComposeError> {
    let casted = frame.column(field)?.cast(&DataType::Float64)?;
    let ca = casted.f64()?;
    Ok(ca.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

fn column_strings(frame: &DataFrame, field: &str) -> Result<Vec<String>, ComposeError> {
    let column = frame.column(field)?;
    Ok((0..column.len())
        .map(|i| {
            column
                .get(i)
                .map(|v| v.to_string().trim_matches('"').to_string())
                .unwrap_or_default()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{self, tests::five_rows};
    use crate::data::FOLD_KEY;

    fn session_with_disorder(df: &DataFrame) -> SessionState {
        let mut session = SessionState::new();
        session.bind_legend("disorder", "Sleep Disorder", df).unwrap();
        session
    }

    fn scatter_spec() -> ViewSpec {
        ViewSpec::new(
            "scatter",
            Mark::Circle,
            Encoding::field("Sleep Duration").domain([5.5, 8.5]),
            Encoding::field("Quality of Sleep").domain([4.0, 9.0]),
        )
        .color("Sleep Disorder")
        .tooltip(&["Person ID", "Gender"])
        .filters(&["disorder"])
    }

    #[test]
    fn unset_selection_passes_full_dataset_through() {
        let file = five_rows();
        let df = loader::load(file.path().to_str().unwrap()).unwrap();
        let session = session_with_disorder(&df);

        let view = View::compose(scatter_spec(), &df, &session).unwrap();
        assert_eq!(view.frame(&session).unwrap().height(), df.height());
    }

    #[test]
    fn set_selection_partitions_the_dataset() {
        let file = five_rows();
        let df = loader::load(file.path().to_str().unwrap()).unwrap();
        let mut session = session_with_disorder(&df);

        let view = View::compose(scatter_spec(), &df, &session).unwrap();

        let mut total = 0;
        for value in ["Insomnia", "None", "Sleep Apnea"] {
            session.set("disorder", Some(value.to_string()));
            let frame = view.frame(&session).unwrap();
            // Only matching rows survive.
            let disorders = loader::unique_values(&frame, "Sleep Disorder");
            assert_eq!(disorders, [value]);
            total += frame.height();
        }
        assert_eq!(total, df.height());
    }

    #[test]
    fn compose_rejects_unknown_selection_and_field() {
        let file = five_rows();
        let df = loader::load(file.path().to_str().unwrap()).unwrap();
        let session = SessionState::new();

        let err = View::compose(scatter_spec(), &df, &session).unwrap_err();
        assert!(matches!(err, ComposeError::UnknownSelection { .. }));

        let session = session_with_disorder(&df);
        let spec = scatter_spec().color("Sleep Quality Disorder");
        let err = View::compose(spec, &df, &session).unwrap_err();
        assert!(matches!(err, ComposeError::UnknownField { .. }));
    }

    #[test]
    fn bar_axis_orders_by_mean_of_sort_field() {
        let file = five_rows();
        let df = loader::load(file.path().to_str().unwrap()).unwrap();
        let session = session_with_disorder(&df);

        // Mean quality per disorder: Sleep Apnea 6.5, Insomnia 7.0, None 6.0.
        let spec = ViewSpec::new(
            "bars",
            Mark::Bar,
            Encoding::field("Sleep Duration").mean(),
            Encoding::field("Sleep Disorder").sorted_by_mean("Quality of Sleep"),
        );
        let view = View::compose(spec, &df, &session).unwrap();
        let bars = view.bar_data(&session).unwrap();

        assert_eq!(bars.labels, ["None", "Sleep Apnea", "Insomnia"]);
        assert_eq!(bars.counts, [1, 2, 2]);
        assert!((bars.means[0] - 6.1).abs() < 1e-9);
        assert!((bars.means[2] - (6.2 + 7.9) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn folded_view_filters_on_the_column_label() {
        let file = five_rows();
        let df = loader::load(file.path().to_str().unwrap()).unwrap();
        let mut session = session_with_disorder(&df);
        session
            .bind_dropdown(
                "xvar",
                FOLD_KEY,
                vec!["Age".to_string(), "Heart Rate".to_string()],
            )
            .unwrap();

        let spec = ViewSpec::new(
            "driver",
            Mark::Circle,
            Encoding::field("value"),
            Encoding::field("Sleep Duration"),
        )
        .color("Sleep Disorder")
        .fold(&["Age".to_string(), "Heart Rate".to_string()])
        .filters(&["xvar", "disorder"]);
        let view = View::compose(spec, &df, &session).unwrap();

        // Unset: the whole folded frame passes through.
        assert_eq!(view.frame(&session).unwrap().height(), df.height() * 2);

        // Dropdown set: one fold column survives.
        session.set("xvar", Some("Age".to_string()));
        assert_eq!(view.frame(&session).unwrap().height(), df.height());

        // Both set: filters are conjunctive.
        session.set("disorder", Some("Insomnia".to_string()));
        assert_eq!(view.frame(&session).unwrap().height(), 2);
    }

    #[test]
    fn histogram_series_counts_respect_shared_bins() {
        let file = five_rows();
        let df = loader::load(file.path().to_str().unwrap()).unwrap();
        let session = session_with_disorder(&df);

        let spec = ViewSpec::new(
            "top_hist",
            Mark::Bar,
            Encoding::field("Sleep Duration").binned(BinConfig::with_extent(6, [5.5, 8.5])),
            Encoding::count(),
        )
        .color("Sleep Disorder")
        .filters(&["disorder"]);
        let view = View::compose(spec, &df, &session).unwrap();

        let hist = view.histogram_data(&session).unwrap();
        assert_eq!(hist.params.edges(), vec![5.5, 6.0, 6.5, 7.0, 7.5, 8.0, 8.5]);
        assert_eq!(hist.series.len(), 3);
        let total: usize = hist
            .series
            .iter()
            .map(|s| s.counts.iter().sum::<usize>())
            .sum();
        assert_eq!(total, df.height());
    }
}

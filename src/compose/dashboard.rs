//! Dashboard Module
//! Assembles the session, the composed views, and the three panel layouts
//! from the application configuration.

use crate::compose::bin::BinConfig;
use crate::compose::layout::Layout;
use crate::compose::selection::SessionState;
use crate::compose::view::{Encoding, Mark, View, ViewSpec};
use crate::compose::ComposeError;
use crate::config::AppConfig;
use crate::data::{FOLD_KEY, FOLD_VALUE};
use polars::prelude::DataFrame;
use std::collections::BTreeMap;

pub const SEL_CATEGORY: &str = "category";
pub const SEL_DISORDER: &str = "disorder";
pub const SEL_XVAR: &str = "xvar";

pub const VIEW_DURATION_BARS: &str = "duration_by_category";
pub const VIEW_QUALITY_BARS: &str = "quality_by_category";
pub const VIEW_SCATTER: &str = "duration_quality_scatter";
pub const VIEW_DURATION_HIST: &str = "duration_hist";
pub const VIEW_QUALITY_HIST: &str = "quality_hist";
pub const VIEW_DRIVER_SCATTER: &str = "driver_scatter";
pub const VIEW_DRIVER_HIST: &str = "driver_hist";

const MARGINAL_THICKNESS: f32 = 60.0;

/// One titled group of linked views.
pub struct Panel {
    pub title: String,
    pub hint: String,
    pub layout: Layout,
}

/// The composed dashboard: one dataset, one session, a fixed set of views
/// arranged into three panels.
pub struct Dashboard {
    session: SessionState,
    views: BTreeMap<String, View>,
    panels: Vec<Panel>,
}

impl Dashboard {
    pub fn compose(config: &AppConfig, df: &DataFrame) -> Result<Self, ComposeError> {
        let mut session = SessionState::new();
        session.bind_dropdown(SEL_CATEGORY, FOLD_KEY, config.category_options.clone())?;
        session.bind_legend(SEL_DISORDER, "Sleep Disorder", df)?;
        session.bind_dropdown(SEL_XVAR, FOLD_KEY, config.numeric_options.clone())?;

        let mut views = BTreeMap::new();
        let mut add = |view: View| {
            views.insert(view.spec.name.clone(), view);
        };

        // Panel 1: mean outcome per category value, ordered by mean quality.
        add(View::compose(
            ViewSpec::new(
                VIEW_DURATION_BARS,
                Mark::Bar,
                Encoding::field("Sleep Duration")
                    .mean()
                    .titled("Mean Sleep Duration"),
                Encoding::field(FOLD_VALUE).sorted_by_mean("Quality of Sleep"),
            )
            .fold(&config.category_options)
            .filters(&[SEL_CATEGORY]),
            df,
            &session,
        )?);
        add(View::compose(
            ViewSpec::new(
                VIEW_QUALITY_BARS,
                Mark::Bar,
                Encoding::field("Quality of Sleep")
                    .mean()
                    .titled("Mean Quality of Sleep"),
                Encoding::field(FOLD_VALUE).sorted_by_mean("Quality of Sleep"),
            )
            .fold(&config.category_options)
            .filters(&[SEL_CATEGORY]),
            df,
            &session,
        )?);

        // Panel 2: scatter plus marginal histograms sharing its domains.
        add(View::compose(
            ViewSpec::new(
                VIEW_SCATTER,
                Mark::Circle,
                Encoding::field("Sleep Duration").domain(config.duration_domain),
                Encoding::field("Quality of Sleep")
                    .domain(config.quality_domain)
                    .titled("Sleep Quality"),
            )
            .color("Sleep Disorder")
            .tooltip(&["Person ID", "Gender", "Age", "Occupation", "Sleep Disorder"])
            .filters(&[SEL_DISORDER]),
            df,
            &session,
        )?);
        add(View::compose(
            ViewSpec::new(
                VIEW_DURATION_HIST,
                Mark::Bar,
                Encoding::field("Sleep Duration")
                    .binned(BinConfig::with_extent(config.max_bins, config.duration_domain))
                    .titled(""),
                Encoding::count(),
            )
            .color("Sleep Disorder")
            .filters(&[SEL_DISORDER])
            .size(250.0, MARGINAL_THICKNESS),
            df,
            &session,
        )?);
        add(View::compose(
            ViewSpec::new(
                VIEW_QUALITY_HIST,
                Mark::Bar,
                Encoding::count(),
                Encoding::field("Quality of Sleep")
                    .binned(BinConfig::with_extent(config.max_bins, config.quality_domain))
                    .titled(""),
            )
            .color("Sleep Disorder")
            .filters(&[SEL_DISORDER])
            .size(MARGINAL_THICKNESS, 250.0),
            df,
            &session,
        )?);

        // Panel 3: folded numeric drivers against sleep duration.
        add(View::compose(
            ViewSpec::new(
                VIEW_DRIVER_SCATTER,
                Mark::Circle,
                Encoding::field(FOLD_VALUE).titled(""),
                Encoding::field("Sleep Duration"),
            )
            .color("Sleep Disorder")
            .tooltip(&["Person ID", "Gender", "Age", "Occupation", FOLD_VALUE])
            .fold(&config.numeric_options)
            .filters(&[SEL_XVAR, SEL_DISORDER]),
            df,
            &session,
        )?);
        add(View::compose(
            ViewSpec::new(
                VIEW_DRIVER_HIST,
                Mark::Bar,
                Encoding::field(FOLD_VALUE)
                    .binned(BinConfig::new(config.max_bins))
                    .titled(""),
                Encoding::count(),
            )
            .color("Sleep Disorder")
            .fold(&config.numeric_options)
            .filters(&[SEL_XVAR, SEL_DISORDER]),
            df,
            &session,
        )?);

        let panels = vec![
            Panel {
                title: "Sleep Duration and Quality by Category".to_string(),
                hint: "Use the dropdown to select a category.".to_string(),
                layout: Layout::row(vec![
                    Layout::view(VIEW_DURATION_BARS),
                    Layout::view(VIEW_QUALITY_BARS),
                ]),
            },
            Panel {
                title: "Sleep Duration vs. Sleep Quality by Sleep Disorder".to_string(),
                hint: "Click the legend to filter results.".to_string(),
                layout: Layout::column(vec![
                    Layout::view(VIEW_DURATION_HIST),
                    Layout::row(vec![
                        Layout::view(VIEW_SCATTER),
                        Layout::view(VIEW_QUALITY_HIST),
                    ]),
                ]),
            },
            Panel {
                title: "Sleep Duration Drivers".to_string(),
                hint: "Pick an x-variable; click the legend to filter.".to_string(),
                layout: Layout::row(vec![
                    Layout::view(VIEW_DRIVER_SCATTER),
                    Layout::view(VIEW_DRIVER_HIST),
                ]),
            },
        ];

        Ok(Self {
            session,
            views,
            panels,
        })
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionState {
        &mut self.session
    }

    pub fn view(&self, name: &str) -> Option<&View> {
        self.views.get(name)
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{self, tests::five_rows};

    #[test]
    fn every_layout_reference_resolves() {
        let file = five_rows();
        let df = loader::load(file.path().to_str().unwrap()).unwrap();
        let dashboard = Dashboard::compose(&AppConfig::default(), &df).unwrap();

        assert_eq!(dashboard.panels().len(), 3);
        for panel in dashboard.panels() {
            for name in panel.layout.view_names() {
                assert!(dashboard.view(name).is_some(), "unresolved view {name}");
            }
        }
    }

    #[test]
    fn selections_start_unset_with_configured_options() {
        let file = five_rows();
        let df = loader::load(file.path().to_str().unwrap()).unwrap();
        let dashboard = Dashboard::compose(&AppConfig::default(), &df).unwrap();

        let session = dashboard.session();
        assert_eq!(session.value(SEL_CATEGORY), None);
        assert_eq!(session.value(SEL_DISORDER), None);
        assert_eq!(session.value(SEL_XVAR), None);
        assert_eq!(
            session.get(SEL_XVAR).unwrap().options,
            AppConfig::default().numeric_options
        );
    }

    #[test]
    fn marginal_bins_share_the_scatter_domain() {
        let file = five_rows();
        let df = loader::load(file.path().to_str().unwrap()).unwrap();
        let config = AppConfig::default();
        let dashboard = Dashboard::compose(&config, &df).unwrap();

        let scatter = dashboard.view(VIEW_SCATTER).unwrap();
        let top = dashboard.view(VIEW_DURATION_HIST).unwrap();
        let hist = top.histogram_data(dashboard.session()).unwrap();

        let domain = scatter.spec.x.domain.unwrap();
        let edges = hist.params.edges();
        assert_eq!(edges.first().copied(), Some(domain[0]));
        assert_eq!(edges.last().copied(), Some(domain[1]));
        assert_eq!(domain, config.duration_domain);
    }
}

//! Layout Module
//! Structural arrangement of independent views. Carries no interaction
//! logic; views stay linked only through the selections they share.

use serde::{Deserialize, Serialize};

/// Arrangement tree over composed views, referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    View(String),
    /// Side by side.
    HConcat(Vec<Layout>),
    /// Stacked.
    VConcat(Vec<Layout>),
}

impl Layout {
    pub fn view(name: &str) -> Self {
        Layout::View(name.to_string())
    }

    /// Arrange items side by side.
    pub fn row(items: Vec<Layout>) -> Self {
        Layout::HConcat(items)
    }

    /// Stack items vertically.
    pub fn column(items: Vec<Layout>) -> Self {
        Layout::VConcat(items)
    }

    /// Names of every view in the tree, in draw order.
    pub fn view_names(&self) -> Vec<&str> {
        match self {
            Layout::View(name) => vec![name.as_str()],
            Layout::HConcat(items) | Layout::VConcat(items) => {
                items.iter().flat_map(|item| item.view_names()).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_names_walk_in_draw_order() {
        let layout = Layout::column(vec![
            Layout::view("top_hist"),
            Layout::row(vec![Layout::view("scatter"), Layout::view("right_hist")]),
        ]);
        assert_eq!(layout.view_names(), ["top_hist", "scatter", "right_hist"]);
    }
}

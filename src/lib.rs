//! Table data pipeline: resolves cell values, sorts rows stably per column
//! type, summarizes columns and lets plugins add class names and styles to
//! cells, such as a heatmap. The viewer modules put the result in a terminal.

pub mod color;
pub mod column;
pub mod controller;
pub mod domain;
pub mod format;
pub mod load;
pub mod logging;
pub mod plugin;
pub mod resolve;
pub mod sort;
pub mod style;
pub mod summarize;
pub mod table;
pub mod td_class_names;
pub mod ui;
pub mod value;
pub mod viewer;

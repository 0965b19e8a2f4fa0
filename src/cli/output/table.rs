//! Table output formatting for CLI commands using comfy-table.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use crate::domain::models::{AppType, BlacklistEntry, CatalogSummary, ComponentPools};
use crate::services::BlacklistStats;

use super::truncate;

pub struct TableFormatter {
    use_colors: bool,
    max_width: Option<u16>,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    pub fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// Row counts of a (platform, app type) pool selection.
    pub fn format_pool_counts(&self, pools: &ComponentPools) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&["Pool", "Entries"]));

        let active_builds = pools.build_numbers.iter().filter(|b| b.is_active()).count();
        let rows = [
            ("device models", pools.device_models.len().to_string()),
            ("version components", pools.version_components.len().to_string()),
            (
                "build numbers",
                format!("{} ({active_builds} active)", pools.build_numbers.len()),
            ),
            ("language weights", pools.language_weights.len().to_string()),
            ("resolutions", pools.resolutions.len().to_string()),
            ("dpis", pools.dpis.len().to_string()),
            ("os versions", pools.os_versions.len().to_string()),
        ];
        for (name, count) in rows {
            table.add_row(vec![Cell::new(name), Cell::new(count)]);
        }
        table.to_string()
    }

    pub fn format_devices(&self, pools: &ComponentPools) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&["Model", "Manufacturer", "OS", "Chipset", "Code", "Screens"]));

        for device in &pools.device_models {
            let os = match (&device.min_os_version, &device.max_os_version, &device.os_version) {
                (Some(min), Some(max), _) => format!("{min}-{max}"),
                (_, _, Some(anchor)) => anchor.clone(),
                _ => "-".to_string(),
            };
            let chipset = device.chipset.clone().unwrap_or_else(|| "-".to_string());
            let chipset_cell = if self.use_colors && device.chipset.is_none() {
                Cell::new(chipset).fg(Color::Yellow)
            } else {
                Cell::new(chipset)
            };
            table.add_row(vec![
                Cell::new(&device.model),
                Cell::new(&device.manufacturer),
                Cell::new(os),
                chipset_cell,
                Cell::new(device.device_code.as_deref().unwrap_or("-")),
                Cell::new(device.resolutions.join(", ")),
            ]);
        }
        table.to_string()
    }

    pub fn format_catalog_summary(&self, summary: &CatalogSummary) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&["Pool", "Rows"]));
        let rows = [
            ("device models", summary.device_models),
            ("version components", summary.version_components),
            ("build numbers", summary.build_numbers),
            ("language weights", summary.language_weights),
            ("resolutions", summary.resolutions),
            ("dpis", summary.dpis),
            ("os versions", summary.os_versions),
        ];
        for (name, count) in rows {
            table.add_row(vec![Cell::new(name), Cell::new(count)]);
        }
        table.to_string()
    }

    pub fn format_blacklist_stats(&self, stats: &BlacklistStats) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&["App type", "Entries"]));
        for app_type in AppType::ALL {
            let count = stats.by_app_type.get(&app_type).copied().unwrap_or(0);
            table.add_row(vec![Cell::new(app_type), Cell::new(count)]);
        }
        table.add_row(vec![
            Cell::new("total").add_attribute(Attribute::Bold),
            Cell::new(stats.total).add_attribute(Attribute::Bold),
        ]);
        table.to_string()
    }

    pub fn format_blacklist_entries(&self, entries: &[BlacklistEntry]) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&["Hash", "App type", "Attribution", "Agent"]));
        for entry in entries {
            table.add_row(vec![
                Cell::new(&entry.hash[..12.min(entry.hash.len())]),
                Cell::new(entry.app_type),
                Cell::new(&entry.attribution),
                Cell::new(truncate(&entry.agent, 80)),
            ]);
        }
        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if let Some(width) = self.max_width {
            table.set_width(width);
        }
        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|name| Cell::new(name).add_attribute(Attribute::Bold))
        .collect()
}

fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}

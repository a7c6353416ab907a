//! Terminal rendering for catalog view-models.
//!
//! Each function draws one view-model to a string; callers decide where it
//! goes. Structured output (`--output json|yaml`) bypasses this module.

use skills_core::filter::FilterState;
use skills_core::types::{Catalog, Category, CategoryInfo};
use skills_core::view::{
    Badge, CardView, CatalogView, Content, DetailView, ModalView, PipelineKind, Tab, TableView,
};
use std::fmt::Write;

/// Width of the description column in card listings.
const DESCRIPTION_WIDTH: usize = 50;

/// Draws the card grid as a table, or the placeholder message.
pub fn render_catalog(view: &CatalogView) -> String {
    let mut out = String::new();
    match view {
        CatalogView::Empty { message } => {
            let _ = writeln!(out, "{message}");
        }
        CatalogView::Cards { count, cards } => {
            let _ = writeln!(
                out,
                "{:<25}  {:<18}  {:<10}  {:<DESCRIPTION_WIDTH$}",
                "NAME", "BADGES", "BACKENDS", "DESCRIPTION"
            );
            let _ = writeln!(out, "{}", "-".repeat(25 + 18 + 10 + DESCRIPTION_WIDTH + 6));
            for card in cards {
                render_card_row(&mut out, card);
            }
            let _ = writeln!(out);
            let _ = writeln!(out, "{count} skill(s)");
        }
    }
    out
}

fn render_card_row(out: &mut String, card: &CardView) {
    let badges = card
        .badges
        .iter()
        .map(|b| b.label.as_str())
        .collect::<Vec<_>>()
        .join(",");
    let backends = card
        .backends
        .iter()
        .map(|b| b.icon.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(
        out,
        "{:<25}  {:<18}  {:<10}  {}",
        truncate(&card.name, 25),
        truncate(&badges, 18),
        truncate(&backends, 10),
        truncate(&card.description, DESCRIPTION_WIDTH),
    );
    if !card.input_tags.is_empty() {
        let _ = writeln!(out, "{:<25}  inputs: {}", "", card.input_tags.join(" "));
    }
}

/// One-line summary of the active filters, empty when none are set.
pub fn render_filter(state: &FilterState) -> String {
    if state.is_empty() {
        return String::new();
    }
    let mut parts = vec![format!("category={}", state.category.as_str())];
    if !state.query().is_empty() {
        parts.push(format!("search=\"{}\"", state.query()));
    }
    if state.local_only {
        parts.push("local-only".to_string());
    }
    if state.no_credentials {
        parts.push("no-credentials".to_string());
    }
    format!("Filters: {}", parts.join("  "))
}

/// Category summaries, preferring the catalog's own descriptions.
pub fn render_categories(catalog: &Catalog, counts: &[(Category, usize)]) -> String {
    let mut out = String::from("Categories:\n");
    for (category, count) in counts {
        let info: Option<&CategoryInfo> = catalog.categories.get(category.as_str());
        let description = info.map(|i| i.description.as_str()).unwrap_or_default();
        let _ = writeln!(out, "  {:<12} {:>3} skills  {}", category.as_str(), count, description);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Total: {} skills", catalog.total_skills.max(catalog.skills.len()));
    out
}

/// Draws the modal: the loading phase or the full detail.
pub fn render_modal(view: &ModalView) -> String {
    match view {
        ModalView::Loading { name, message } => format!("{name}\n{message}\n"),
        ModalView::Detail(detail) => render_detail(detail),
    }
}

pub fn render_detail(detail: &DetailView) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# {}", detail.header.name);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", detail.header.description);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", render_badges(&detail.header.badges));
    if !detail.header.tags.is_empty() {
        let _ = writeln!(out, "Tags: {}", detail.header.tags.join(", "));
    }
    let _ = writeln!(out);

    let tabs = [Tab::Spec, Tab::Pipeline]
        .iter()
        .map(|t| {
            if *t == detail.active_tab {
                format!("[{}]", t.label())
            } else {
                format!(" {} ", t.label())
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(out, "{tabs}");
    let _ = writeln!(out, "{}", "=".repeat(60));

    match detail.active_tab {
        Tab::Spec => render_spec_tab(&mut out, detail),
        Tab::Pipeline => render_pipeline_tab(&mut out, detail),
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "View Source: {}", detail.footer.source_url);
    out
}

fn render_badges(badges: &[Badge]) -> String {
    badges
        .iter()
        .map(|b| format!("[{}]", b.label))
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_spec_tab(out: &mut String, detail: &DetailView) {
    for table in &detail.spec.tables {
        render_table(out, table);
    }

    let _ = writeln!(out, "## Documentation");
    render_content(out, &detail.spec.documentation);

    let _ = writeln!(out, "## Skill Definition (skill.yaml)");
    render_content(out, &detail.spec.definition);
}

fn render_pipeline_tab(out: &mut String, detail: &DetailView) {
    let pipeline = &detail.pipeline;
    let subtabs = [PipelineKind::Cli, PipelineKind::Mcp]
        .iter()
        .map(|k| {
            if *k == pipeline.active {
                format!("[{}]", k.label())
            } else {
                format!(" {} ", k.label())
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(out, "{subtabs}");
    let _ = writeln!(out);

    if let Some(pane) = pipeline.pane(pipeline.active) {
        if pane.content.text().is_some() {
            let _ = writeln!(out, "{}", pane.description);
            let _ = writeln!(out);
        }
        render_content(out, &pane.content);
    }

    let deploy = &pipeline.deploy;
    let _ = writeln!(out, "## Deploy to Expanso Cloud");
    let _ = writeln!(out, "{}", deploy.description);
    let _ = writeln!(out);
    let _ = writeln!(out, "Deploy via CLI:");
    render_code(out, "bash", &deploy.command);
    let _ = writeln!(out, "Deploy via Cloud UI:");
    for (i, step) in deploy.cloud_steps.iter().enumerate() {
        let _ = writeln!(out, "  {}. {step}", i + 1);
    }
}

fn render_table(out: &mut String, table: &TableView) {
    let _ = writeln!(out, "## {}", table.title);

    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.text.chars().count());
            }
        }
    }

    let header = table
        .headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{h:<w$}"))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "  {}", header.trim_end());
    let total: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    let _ = writeln!(out, "  {}", "-".repeat(total));

    for row in &table.rows {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<w$}", cell.text))
            .collect::<Vec<_>>()
            .join("  ");
        let _ = writeln!(out, "  {}", line.trim_end());
    }
    let _ = writeln!(out);
}

fn render_content(out: &mut String, content: &Content) {
    match content {
        Content::Code { language, text } => render_code(out, language, text),
        Content::Unavailable { message } => {
            let _ = writeln!(out, "{message}");
            let _ = writeln!(out);
        }
    }
}

fn render_code(out: &mut String, language: &str, text: &str) {
    let _ = writeln!(out, "```{language}");
    out.push_str(text);
    if !text.ends_with('\n') {
        out.push('\n');
    }
    let _ = writeln!(out, "```");
    let _ = writeln!(out);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

use anyhow::Result;
use colored::*;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use docs_index::{OpenedSection, RoutingDecision, SearchResultItem};

pub struct OutputFormatter {
    format: String,
}

impl OutputFormatter {
    pub fn new(format: &str) -> Self {
        Self {
            format: format.to_string(),
        }
    }

    pub fn is_json(&self) -> bool {
        self.format == "json"
    }

    pub fn display_search_results(&self, routing: &RoutingDecision, results: &[SearchResultItem]) -> Result<()> {
        println!(
            "{} routed to: {}",
            "🔎".blue(),
            routing.selected_docsets.join(", ").cyan()
        );

        let mut table = Table::new();
        table
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Score").add_attribute(Attribute::Bold),
                Cell::new("Docset").add_attribute(Attribute::Bold),
                Cell::new("Title").add_attribute(Attribute::Bold),
                Cell::new("Snippet").add_attribute(Attribute::Bold),
            ]);

        for result in results {
            let score_color = if result.score > 0.8 {
                Color::Green
            } else if result.score > 0.5 {
                Color::Yellow
            } else {
                Color::Red
            };
            let snippet = if result.snippet.text.len() > 80 {
                format!("{}...", &result.snippet.text[..77])
            } else {
                result.snippet.text.clone()
            };
            table.add_row(vec![
                Cell::new(format!("{:.3}", result.score)).fg(score_color),
                Cell::new(&result.docset_id).fg(Color::Cyan),
                Cell::new(&result.title).add_attribute(Attribute::Bold),
                Cell::new(snippet),
            ]);
        }

        println!("{table}");
        Ok(())
    }

    pub fn display_opened_section(&self, opened: &OpenedSection) -> Result<()> {
        let title = opened.section.heading_path.last().cloned().unwrap_or_default();
        println!("{} {}", "📄".blue(), title.green().bold());
        println!("   {} {}", "file:".dimmed(), opened.section.file_path);
        println!("   {} {}", "anchor:".dimmed(), opened.section.anchor);
        if let Some(version) = &opened.version {
            println!("   {} {}", "version:".dimmed(), version);
        }
        println!();
        println!("{}", opened.section.text);
        for code in &opened.section.code_blocks {
            println!();
            println!("{}", code.dimmed());
        }
        for asset in &opened.assets {
            if let Some(url) = &asset.url {
                println!("{} {}", "🖼".blue(), url.cyan());
            }
        }
        Ok(())
    }

    pub fn display_success_message(&self, message: &str) -> Result<()> {
        println!("{} {}", "✅".green(), message.green().bold());
        Ok(())
    }

    pub fn display_info_message(&self, message: &str) -> Result<()> {
        println!("{} {}", "ℹ️".blue(), message);
        Ok(())
    }

    pub fn display_warning_message(&self, message: &str) -> Result<()> {
        println!("{} {}", "⚠️".yellow(), message.yellow());
        Ok(())
    }

    pub fn display_error_message(&self, message: &str) -> Result<()> {
        println!("{} {}", "❌".red(), message.red());
        Ok(())
    }

    pub fn display_progress_start(&self, message: &str) -> Result<()> {
        println!("{} {}...", "🔄".blue(), message);
        Ok(())
    }
}

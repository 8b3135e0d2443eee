use super::ComponentReport;
use crate::components::{versions_string, AffectedComponent};
use crate::model::Entry;
use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Aliases")]
    aliases: String,
    #[tabled(rename = "Summary")]
    summary: String,
}

#[derive(Tabled)]
struct AffectedRow {
    #[tabled(rename = "Module")]
    module: String,
    #[tabled(rename = "Versions")]
    versions: String,
    #[tabled(rename = "Packages")]
    packages: String,
}

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Versions")]
    versions: String,
    #[tabled(rename = "Exported")]
    exported: String,
    #[tabled(rename = "Unexported")]
    unexported: String,
}

pub fn print_entries_table(entries: &[Entry]) -> Result<()> {
    println!();
    if entries.is_empty() {
        println!("No vulnerabilities found.");
        return Ok(());
    }

    println!("Found {} vulnerabilities:", entries.len());
    println!();

    let rows: Vec<EntryRow> = entries
        .iter()
        .map(|e| EntryRow {
            id: e.id.clone(),
            aliases: truncate(&e.aliases.join(", "), 40),
            summary: truncate(e.title(), 60),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
    Ok(())
}

pub fn print_entry_table(entry: &Entry) -> Result<()> {
    println!();
    println!("{}", entry.id);
    if !entry.aliases.is_empty() {
        println!("Aliases: {}", entry.aliases.join(", "));
    }
    if let Some(published) = entry.published {
        println!("Published: {}", published.format("%Y-%m-%d"));
    }
    if let Some(summary) = &entry.summary {
        println!();
        println!("{}", summary);
    }
    if let Some(details) = &entry.details {
        println!();
        println!("{}", details.trim_end());
    }

    if !entry.affected.is_empty() {
        println!();
        let rows: Vec<AffectedRow> = entry
            .affected
            .iter()
            .map(|a| AffectedRow {
                module: a.module.path.clone(),
                versions: or_dash(versions_string(a)),
                packages: or_dash(
                    a.ecosystem_specific
                        .packages
                        .iter()
                        .map(|p| p.path.as_str())
                        .collect::<Vec<_>>()
                        .join("\n"),
                ),
            })
            .collect();

        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{}", table);
    }

    if let Some(url) = entry.database_specific.as_ref().map(|d| &d.url) {
        if !url.is_empty() {
            println!();
            println!("More info: {}", url);
        }
    }
    Ok(())
}

pub fn print_components_table(report: &ComponentReport<'_>) -> Result<()> {
    println!();
    println!("Components affected by {}:", report.id);
    println!();

    let rows: Vec<ComponentRow> = report
        .modules
        .iter()
        .chain(report.packages)
        .map(component_row)
        .collect();

    if rows.is_empty() {
        println!("No affected components listed.");
        return Ok(());
    }

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
    Ok(())
}

fn component_row(component: &AffectedComponent) -> ComponentRow {
    ComponentRow {
        path: component.path.clone(),
        versions: or_dash(component.versions.clone()),
        exported: or_dash(component.exported_symbols.join("\n")),
        unexported: or_dash(component.unexported_symbols.join("\n")),
    }
}

fn or_dash(s: String) -> String {
    if s.is_empty() {
        "-".to_string()
    } else {
        s
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
        assert_eq!(truncate("this is longer", 10), "this is...");
        assert_eq!(truncate("ééééééééééé", 6), "ééé...");
    }

    #[test]
    fn test_component_row() {
        let row = component_row(&AffectedComponent {
            path: "example.com/mod/pkg".to_string(),
            exported_symbols: vec!["F".to_string(), "S.M".to_string()],
            ..AffectedComponent::default()
        });

        assert_eq!(row.path, "example.com/mod/pkg");
        assert_eq!(row.versions, "-");
        assert_eq!(row.exported, "F\nS.M");
        assert_eq!(row.unexported, "-");
    }
}

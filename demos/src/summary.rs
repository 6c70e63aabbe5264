use std::fmt;
use tls_finder::TlsReport;

/// Plain-text summary of an analysis, for terminal output.
pub struct ReportSummary<'a>(pub &'a TlsReport);

impl fmt::Display for ReportSummary<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let report = self.0;

    writeln!(f, "Cells: {}", report.n_cells)?;
    for (cell_type, count) in &report.type_counts {
      writeln!(f, "  {:<16} {count:>8}", cell_type.as_str())?;
    }

    for group in &report.groups {
      let types: Vec<&str> = group.types.iter().map(|t| t.as_str()).collect();
      writeln!(f)?;
      writeln!(
        f,
        "Group {} ({}): {} clusters, {} unclassified cells",
        group.name,
        types.join(", "),
        group.assignment.n_clusters(),
        group.assignment.n_unclassified()
      )?;
      for cluster in &group.clusters {
        writeln!(f, "  {:<12} {:>6} cells", cluster.name.to_string(), cluster.size)?;
      }
    }

    writeln!(f)?;
    writeln!(
      f,
      "Surroundings of group {}: {} rows",
      report.expansion_group,
      report.surroundings.len()
    )?;
    for row in &report.composition {
      if row.percent > 0.0 {
        writeln!(
          f,
          "  {:<12} {:<16} {:>6.2}%",
          row.cluster.to_string(),
          row.cell_type.as_str(),
          row.percent
        )?;
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tls_finder::Cell;
  use tls_finder::PointSet;
  use tls_finder::TlsConfig;
  use tls_finder::TlsFinder;

  #[test]
  fn lists_groups_clusters_and_composition() {
    let mut cells: Vec<Cell> = (0..20)
      .map(|i| Cell::new(i as f64, 0.0, "Bcell", "stroma"))
      .collect();
    cells.push(Cell::new(500.0, 500.0, "CD15-Tumor", "tumor"));
    let points = PointSet::new(cells).unwrap();
    let report = TlsFinder::new(TlsConfig::default())
      .unwrap()
      .analyze(&points)
      .unwrap();

    let text = ReportSummary(&report).to_string();

    assert!(text.starts_with("Cells: 21\n"));
    assert!(text.contains("Group immune (Bcell, BnT, Tcell): 1 clusters, 0 unclassified cells"));
    assert!(text.contains("TLS no. 1"));
    let row = text.lines().find(|l| l.contains("Bcell") && l.ends_with('%')).unwrap();
    assert!(row.trim_start().starts_with("TLS no. 1"));
    assert!(row.ends_with("100.00%"));
  }
}

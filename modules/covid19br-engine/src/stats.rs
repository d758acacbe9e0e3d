/// Stats from a crawl run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CrawlStats {
    pub sources_run: u32,
    pub sources_failed: u32,
    pub sources_skipped: u32,
    pub bulletins_admitted: u32,
    pub bulletins_rejected: u32,
    pub reports_built: u32,
    pub reports_empty: u32,
    pub reports_rejected: u32,
    pub total_mismatches: u32,
    pub quality_mismatches: u32,
}

impl std::fmt::Display for CrawlStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Crawl Complete ===")?;
        writeln!(f, "Sources run:        {}", self.sources_run)?;
        writeln!(f, "Sources failed:     {}", self.sources_failed)?;
        writeln!(f, "Sources skipped:    {}", self.sources_skipped)?;
        writeln!(f, "Bulletins admitted: {}", self.bulletins_admitted)?;
        writeln!(f, "Bulletins rejected: {}", self.bulletins_rejected)?;
        writeln!(f, "\nReports:")?;
        writeln!(f, "  Built:    {}", self.reports_built)?;
        writeln!(f, "  Empty:    {}", self.reports_empty)?;
        writeln!(f, "  Rejected: {}", self.reports_rejected)?;
        if self.total_mismatches + self.quality_mismatches > 0 {
            writeln!(f, "\nWarnings:")?;
            writeln!(f, "  Total mismatches:   {}", self.total_mismatches)?;
            writeln!(f, "  Quality mismatches: {}", self.quality_mismatches)?;
        }
        Ok(())
    }
}

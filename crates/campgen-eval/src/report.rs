use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};

use campgen_core::{Campaign, Constant, Dataset, Metric, Operator, Predicate, WtAttribute};

use crate::errors::EvalError;

/// Output format of the campaign report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Html,
    Markdown,
}

impl ReportFormat {
    /// Markdown for `.md`/`.markdown` paths, HTML otherwise.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("md") | Some("markdown") => Self::Markdown,
            _ => Self::Html,
        }
    }
}

/// Render every campaign with its validity window, firing policy and
/// condition. Conjuncts are ordered by id, predicates by id within a conjunct.
pub fn render_report(dataset: &Dataset, format: ReportFormat) -> Result<String, EvalError> {
    let index = DatasetIndex::new(dataset);
    let mut campaigns: Vec<&Campaign> = dataset.campaigns.iter().collect();
    campaigns.sort_by_key(|campaign| campaign.id);

    let mut out = String::new();
    match format {
        ReportFormat::Html => {
            out.push_str("<html><head><title>Campaigns</title></head><body>\n");
            for campaign in campaigns {
                render_html_campaign(&mut out, &index, campaign)?;
            }
            out.push_str("</body></html>\n");
        }
        ReportFormat::Markdown => {
            out.push_str("# Campaigns\n");
            for campaign in campaigns {
                render_markdown_campaign(&mut out, &index, campaign)?;
            }
        }
    }
    Ok(out)
}

/// Render the report to `path`, choosing the format from its extension.
pub fn write_report(path: &Path, dataset: &Dataset) -> Result<ReportFormat, EvalError> {
    let format = ReportFormat::from_path(path);
    std::fs::write(path, render_report(dataset, format)?)?;
    Ok(format)
}

fn render_html_campaign(
    out: &mut String,
    index: &DatasetIndex<'_>,
    campaign: &Campaign,
) -> Result<(), EvalError> {
    out.push_str(&format!(
        "<h3>Campaign {}</h3>\n<table style='border-collapse: collapse'>\n",
        campaign.id
    ));
    out.push_str(&format!(
        "<tr><td><b>validity period:&nbsp;&nbsp;</b></td><td>{} &ndash; {}</td></tr>\n",
        format_date(campaign.valid_from)?,
        format_date(campaign.valid_to)?
    ));
    out.push_str(&format!(
        "<tr><td><b>firing interval:</b></td><td>{}</td></tr>\n",
        campaign.firing_interval
    ));
    out.push_str(&format!(
        "<tr><td><b>firing start:</b></td><td>{}</td></tr>\n",
        campaign.firing_start_condition
    ));
    out.push_str("<tr><td valign='top'><b>condition:</b></td><td>");

    let conjuncts = condition(index, campaign.id)?;
    let rendered: Vec<String> = conjuncts
        .iter()
        .map(|terms| {
            let terms: Vec<String> = terms
                .iter()
                .map(|term| {
                    format!(
                        "{}({}) &{}; {}",
                        term.aggregation,
                        escape_html(term.metric),
                        term.operator.symbol(),
                        escape_html(term.value)
                    )
                })
                .collect();
            format!("\n[{}", terms.join(" &and; "))
        })
        .collect();
    out.push_str(&rendered.join("] &or;<br/>"));
    if !rendered.is_empty() {
        out.push(']');
    }
    out.push_str("\n</td></tr>\n</table>\n");
    Ok(())
}

fn render_markdown_campaign(
    out: &mut String,
    index: &DatasetIndex<'_>,
    campaign: &Campaign,
) -> Result<(), EvalError> {
    out.push_str(&format!("\n## Campaign {}\n\n", campaign.id));
    out.push_str(&format!(
        "- validity period: {} – {}\n",
        format_date(campaign.valid_from)?,
        format_date(campaign.valid_to)?
    ));
    out.push_str(&format!("- firing interval: {}\n", campaign.firing_interval));
    out.push_str(&format!("- firing start: {}\n", campaign.firing_start_condition));
    out.push_str("- condition:\n");

    for terms in condition(index, campaign.id)? {
        let terms: Vec<String> = terms
            .iter()
            .map(|term| {
                format!(
                    "{}({}) {} {}",
                    term.aggregation,
                    term.metric,
                    operator_glyph(term.operator),
                    term.value
                )
            })
            .collect();
        out.push_str(&format!("  - [{}]\n", terms.join(" ∧ ")));
    }
    Ok(())
}

/// One rendered predicate: `aggregation(metric) operator value`.
struct Term<'a> {
    aggregation: &'a str,
    metric: &'a str,
    operator: Operator,
    value: &'a str,
}

struct DatasetIndex<'a> {
    metrics: HashMap<u32, &'a Metric>,
    attributes: HashMap<u32, &'a WtAttribute>,
    constants: HashMap<u32, &'a Constant>,
    predicates: HashMap<u32, &'a Predicate>,
    /// Conjunct ids per campaign, ascending.
    conjuncts: HashMap<u32, Vec<u32>>,
    /// Predicate ids per conjunct, ascending.
    links: HashMap<u32, Vec<u32>>,
}

impl<'a> DatasetIndex<'a> {
    fn new(dataset: &'a Dataset) -> Self {
        let mut conjuncts: HashMap<u32, Vec<u32>> = HashMap::new();
        for conjunct in &dataset.conjuncts {
            conjuncts
                .entry(conjunct.campaign_id)
                .or_default()
                .push(conjunct.id);
        }
        let mut links: HashMap<u32, Vec<u32>> = HashMap::new();
        for link in &dataset.conjunct_predicates {
            links
                .entry(link.conjunct_id)
                .or_default()
                .push(link.predicate_id);
        }
        for ids in conjuncts.values_mut().chain(links.values_mut()) {
            ids.sort_unstable();
        }

        Self {
            metrics: dataset.metrics.iter().map(|row| (row.id, row)).collect(),
            attributes: dataset.wt_attributes.iter().map(|row| (row.id, row)).collect(),
            constants: dataset.constants.iter().map(|row| (row.id, row)).collect(),
            predicates: dataset.predicates.iter().map(|row| (row.id, row)).collect(),
            conjuncts,
            links,
        }
    }

    fn conjunct_ids(&self, campaign_id: u32) -> &[u32] {
        self.conjuncts
            .get(&campaign_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn predicate_ids(&self, conjunct_id: u32) -> &[u32] {
        self.links
            .get(&conjunct_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn term(&self, predicate_id: u32) -> Result<Term<'a>, EvalError> {
        let predicate = self
            .predicates
            .get(&predicate_id)
            .copied()
            .ok_or_else(|| missing("predicate", predicate_id))?;
        let attribute = self
            .attributes
            .get(&predicate.wt_attribute_id)
            .copied()
            .ok_or_else(|| missing("wt_attribute", predicate.wt_attribute_id))?;
        let metric = self
            .metrics
            .get(&attribute.metric_id)
            .copied()
            .ok_or_else(|| missing("metric", attribute.metric_id))?;
        let constant = self
            .constants
            .get(&predicate.constant_id)
            .copied()
            .ok_or_else(|| missing("constant", predicate.constant_id))?;

        Ok(Term {
            aggregation: attribute.aggregation_fn.as_str(),
            metric: metric.name.as_str(),
            operator: predicate.operator,
            value: constant.value.as_str(),
        })
    }
}

fn condition<'a>(
    index: &DatasetIndex<'a>,
    campaign_id: u32,
) -> Result<Vec<Vec<Term<'a>>>, EvalError> {
    index
        .conjunct_ids(campaign_id)
        .iter()
        .map(|&conjunct_id| {
            index
                .predicate_ids(conjunct_id)
                .iter()
                .map(|&predicate_id| index.term(predicate_id))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect()
}

fn missing(table: &str, id: u32) -> EvalError {
    EvalError::InvalidDataset(format!("{table} {id} is referenced but missing"))
}

/// `Jan 1, 2012` in UTC.
fn format_date(millis: i64) -> Result<String, EvalError> {
    let date = DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| EvalError::InvalidDataset(format!("timestamp {millis} out of range")))?;
    Ok(date.format("%b %-d, %Y").to_string())
}

fn operator_glyph(operator: Operator) -> &'static str {
    match operator {
        Operator::Gr => ">",
        Operator::Lt => "<",
        Operator::Gre => "≥",
        Operator::Lte => "≤",
    }
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

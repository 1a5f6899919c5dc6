use serde::Serialize;

/// One entry of the dashboard's recent activity list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub icon: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Relative label such as "5 minutes ago".
    pub time: &'static str,
}

/// A card of the patient health summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryCard {
    pub title: &'static str,
    pub value: &'static str,
    pub status: &'static str,
    /// `normal` or `warning`.
    pub level: &'static str,
}

/// Everything the dashboard page renders for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub welcome_name: String,
    pub activities: Vec<Activity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_summary: Option<Vec<SummaryCard>>,
}

use crate::models::{
    account::{Profile, Role},
    activity::{Activity, Dashboard, SummaryCard},
};

const WELCOME: Activity = Activity {
    icon: "✅",
    title: "Welcome to CureXpert",
    description: "Your account has been successfully set up and you're ready to get started.",
    time: "Just now",
};

/// Canned activity entries for one role.
pub trait ActivityFeed {
    fn recent(&self) -> Vec<Activity>;
}

pub struct PatientFeed;
pub struct ProviderFeed;
pub struct PartnerFeed;

impl ActivityFeed for PatientFeed {
    fn recent(&self) -> Vec<Activity> {
        vec![
            Activity {
                icon: "📋",
                title: "Profile Setup Complete",
                description: "Your health profile has been initialized. You can now book appointments.",
                time: "5 minutes ago",
            },
            Activity {
                icon: "💬",
                title: "Welcome Message",
                description: "Our team has sent you a welcome message with next steps.",
                time: "10 minutes ago",
            },
        ]
    }
}

impl ActivityFeed for ProviderFeed {
    fn recent(&self) -> Vec<Activity> {
        vec![
            Activity {
                icon: "🏥",
                title: "Practice Setup",
                description: "Your practice profile has been created. Start adding your services.",
                time: "5 minutes ago",
            },
            Activity {
                icon: "📊",
                title: "Analytics Ready",
                description: "Your practice analytics dashboard is now available.",
                time: "10 minutes ago",
            },
        ]
    }
}

impl ActivityFeed for PartnerFeed {
    fn recent(&self) -> Vec<Activity> {
        vec![
            Activity {
                icon: "🤝",
                title: "Partnership Initiated",
                description: "Your partnership application has been received and is under review.",
                time: "5 minutes ago",
            },
            Activity {
                icon: "📈",
                title: "Investment Dashboard",
                description: "Access your investment portfolio and performance metrics.",
                time: "10 minutes ago",
            },
        ]
    }
}

fn feed_for(role: Role) -> &'static dyn ActivityFeed {
    match role {
        Role::Patient => &PatientFeed,
        Role::Provider => &ProviderFeed,
        Role::Partner => &PartnerFeed,
    }
}

/// The welcome entry followed by the role's own entries.
pub fn activities_for(role: Option<Role>) -> Vec<Activity> {
    let mut activities = vec![WELCOME];
    if let Some(role) = role {
        activities.extend(feed_for(role).recent());
    }
    activities
}

/// The patient health summary shown until real records exist.
pub fn health_summary() -> Vec<SummaryCard> {
    vec![
        SummaryCard {
            title: "Health Profile",
            value: "Setup Complete",
            status: "Ready",
            level: "normal",
        },
        SummaryCard {
            title: "Next Steps",
            value: "Book Appointment",
            status: "Action Required",
            level: "warning",
        },
        SummaryCard {
            title: "Data Sync",
            value: "Pending",
            status: "In Progress",
            level: "warning",
        },
        SummaryCard {
            title: "Health Records",
            value: "0 Records",
            status: "Empty",
            level: "normal",
        },
    ]
}

pub fn dashboard_for(user: &Profile) -> Dashboard {
    Dashboard {
        welcome_name: user.first_name(),
        activities: activities_for(user.role),
        health_summary: (user.role == Some(Role::Patient)).then(health_summary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(role: Option<Role>) -> Vec<&'static str> {
        activities_for(role).iter().map(|a| a.title).collect()
    }

    #[test]
    fn patient_gets_welcome_and_two_entries() {
        assert_eq!(
            titles(Some(Role::Patient)),
            vec!["Welcome to CureXpert", "Profile Setup Complete", "Welcome Message"]
        );
    }

    #[test]
    fn every_role_starts_with_welcome() {
        for role in Role::ALL {
            let activities = activities_for(Some(role));
            assert_eq!(activities.len(), 3);
            assert_eq!(activities[0], WELCOME);
        }
        assert_eq!(titles(Some(Role::Provider))[1], "Practice Setup");
        assert_eq!(titles(Some(Role::Partner))[2], "Investment Dashboard");
    }

    #[test]
    fn no_role_gets_only_welcome() {
        assert_eq!(activities_for(None), vec![WELCOME]);
    }

    #[test]
    fn health_summary_is_for_patients_only() {
        let mut user = Profile {
            id: "user-1".to_string(),
            email: "a@x.com".to_string(),
            name: "Ada Lovelace".to_string(),
            firstname: None,
            lastname: None,
            role: Some(Role::Patient),
            created_at: chrono::Utc::now(),
            last_login: None,
            picture: None,
            verified: None,
            locale: None,
            provider: None,
            oauth_id: None,
        };
        let dashboard = dashboard_for(&user);
        assert_eq!(dashboard.welcome_name, "Ada");
        assert_eq!(dashboard.health_summary.map(|cards| cards.len()), Some(4));

        user.role = Some(Role::Partner);
        assert!(dashboard_for(&user).health_summary.is_none());
    }
}

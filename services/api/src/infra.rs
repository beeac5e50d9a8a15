use chrono::{DateTime, Duration, NaiveDate, Utc};
use conflict_signal::analysis::{
    AlertDraft, AlertRecord, AlertRepository, AnalysisArchive, EscalationPrediction, IncidentId,
    IncidentRecord, IncidentRepository, IncidentRow, IncidentStatus, PatternSnapshot,
    PeaceOpportunity, RiskIndicatorRecord, RiskIndicatorRepository, Severity, StorageError,
    VerificationStatus,
};
use conflict_signal::config::AnalysisConfig;
use conflict_signal::notifications::{
    AlertingState, DispatchError, NotificationActions, NotificationConditions,
    NotificationDirectory, NotificationDraft, NotificationEngine, NotificationEvent,
    NotificationRule, NotificationSink, NotificationType, UserRecord, UserRole,
};
use conflict_signal::{ConflictAnalysisService, ThresholdMonitor};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type AnalysisService = ConflictAnalysisService<InMemoryIncidentStore, InMemoryArchive>;
pub(crate) type Notifications =
    NotificationEngine<InMemoryNotificationStore, InMemoryNotificationStore>;
pub(crate) type Alerting = AlertingState<
    InMemoryIncidentStore,
    InMemoryAlertStore,
    InMemoryNotificationStore,
    InMemoryNotificationStore,
>;

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|_| StorageError::Unavailable("in-memory store poisoned".to_string()))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryIncidentStore {
    incidents: Arc<Mutex<Vec<IncidentRow>>>,
    indicators: Arc<Mutex<Vec<RiskIndicatorRecord>>>,
}

impl InMemoryIncidentStore {
    pub(crate) fn with_data(
        incidents: Vec<IncidentRow>,
        indicators: Vec<RiskIndicatorRecord>,
    ) -> Self {
        Self {
            incidents: Arc::new(Mutex::new(incidents)),
            indicators: Arc::new(Mutex::new(indicators)),
        }
    }

    pub(crate) fn extend(&self, rows: Vec<IncidentRow>) -> Result<(), StorageError> {
        lock(&self.incidents)?.extend(rows);
        Ok(())
    }
}

impl IncidentRepository for InMemoryIncidentStore {
    fn fetch(&self, id: &IncidentId) -> Result<Option<IncidentRow>, StorageError> {
        let guard = lock(&self.incidents)?;
        Ok(guard
            .iter()
            .find(|row| row.id.as_deref().map(str::trim) == Some(id.0.as_str()))
            .cloned())
    }

    fn list(&self, since: Option<DateTime<Utc>>) -> Result<Vec<IncidentRow>, StorageError> {
        let guard = lock(&self.incidents)?;
        let mut rows: Vec<IncidentRow> = guard
            .iter()
            .filter(|row| match (since, row.reported_at) {
                (None, _) => true,
                (Some(since), Some(reported_at)) => reported_at >= since,
                (Some(_), None) => false,
            })
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.reported_at);
        Ok(rows)
    }
}

impl RiskIndicatorRepository for InMemoryIncidentStore {
    fn top_for_region(
        &self,
        region: Option<&str>,
        limit: usize,
    ) -> Result<Vec<RiskIndicatorRecord>, StorageError> {
        let guard = lock(&self.indicators)?;
        let mut readings: Vec<RiskIndicatorRecord> = guard
            .iter()
            .filter(|reading| {
                region.map_or(true, |region| reading.region.eq_ignore_ascii_case(region))
            })
            .cloned()
            .collect();
        readings.sort_by(|a, b| b.value.total_cmp(&a.value));
        readings.truncate(limit);
        Ok(readings)
    }

    fn all(&self) -> Result<Vec<RiskIndicatorRecord>, StorageError> {
        Ok(lock(&self.indicators)?.clone())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryArchive {
    predictions: Arc<Mutex<Vec<EscalationPrediction>>>,
    opportunities: Arc<Mutex<Vec<PeaceOpportunity>>>,
    snapshots: Arc<Mutex<Vec<PatternSnapshot>>>,
}

impl AnalysisArchive for InMemoryArchive {
    fn record_prediction(&self, prediction: &EscalationPrediction) -> Result<(), StorageError> {
        lock(&self.predictions)?.push(prediction.clone());
        Ok(())
    }

    fn record_opportunity(&self, opportunity: &PeaceOpportunity) -> Result<(), StorageError> {
        lock(&self.opportunities)?.push(opportunity.clone());
        Ok(())
    }

    fn record_patterns(&self, snapshot: &PatternSnapshot) -> Result<(), StorageError> {
        lock(&self.snapshots)?.push(snapshot.clone());
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAlertStore {
    alerts: Arc<Mutex<Vec<AlertRecord>>>,
}

impl AlertRepository for InMemoryAlertStore {
    fn create(&self, draft: AlertDraft) -> Result<AlertRecord, StorageError> {
        let mut guard = lock(&self.alerts)?;
        let alert = AlertRecord {
            id: format!("alert-{}", guard.len() + 1),
            title: draft.title,
            message: draft.message,
            severity: draft.severity,
            region: draft.region,
            category: draft.category,
            source: draft.source,
            escalation_level: draft.escalation_level,
            created_at: Utc::now(),
        };
        guard.push(alert.clone());
        Ok(alert)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryNotificationStore {
    rules: Arc<Mutex<Vec<NotificationRule>>>,
    users: Arc<Mutex<Vec<UserRecord>>>,
    sent: Arc<Mutex<Vec<NotificationDraft>>>,
}

impl InMemoryNotificationStore {
    pub(crate) fn new(rules: Vec<NotificationRule>, users: Vec<UserRecord>) -> Self {
        Self {
            rules: Arc::new(Mutex::new(rules)),
            users: Arc::new(Mutex::new(users)),
            sent: Arc::default(),
        }
    }

    pub(crate) fn sent(&self) -> Vec<NotificationDraft> {
        lock(&self.sent).map(|guard| guard.clone()).unwrap_or_default()
    }
}

impl NotificationDirectory for InMemoryNotificationStore {
    fn rules_for(&self, event: NotificationEvent) -> Result<Vec<NotificationRule>, StorageError> {
        Ok(lock(&self.rules)?
            .iter()
            .filter(|rule| rule.event == event)
            .cloned()
            .collect())
    }

    fn users(&self) -> Result<Vec<UserRecord>, StorageError> {
        Ok(lock(&self.users)?.clone())
    }
}

impl NotificationSink for InMemoryNotificationStore {
    fn create(&self, draft: NotificationDraft) -> Result<(), DispatchError> {
        self.sent
            .lock()
            .map_err(|_| DispatchError::Unavailable("notification store poisoned".to_string()))?
            .push(draft);
        Ok(())
    }
}

/// Everything the routes and the demo need, sharing one set of stores.
#[derive(Clone)]
pub(crate) struct Engine {
    pub(crate) store: Arc<InMemoryIncidentStore>,
    pub(crate) inbox: Arc<InMemoryNotificationStore>,
    pub(crate) analysis: Arc<AnalysisService>,
    pub(crate) notifications: Arc<Notifications>,
    pub(crate) alerting: Alerting,
}

impl Engine {
    pub(crate) fn new(
        store: InMemoryIncidentStore,
        inbox: InMemoryNotificationStore,
        config: &AnalysisConfig,
    ) -> Self {
        let store = Arc::new(store);
        let inbox = Arc::new(inbox);
        let analysis = Arc::new(ConflictAnalysisService::new(
            store.clone(),
            Arc::new(InMemoryArchive::default()),
            config,
        ));
        let notifications = Arc::new(NotificationEngine::new(
            inbox.clone(),
            inbox.clone(),
            config.notifications.clone(),
        ));
        let monitor = ThresholdMonitor::new(
            store.clone(),
            Arc::new(InMemoryAlertStore::default()),
            config.thresholds.clone(),
        );
        let alerting = AlertingState {
            monitor: Arc::new(monitor),
            notifications: notifications.clone(),
        };

        Self {
            store,
            inbox,
            analysis,
            notifications,
            alerting,
        }
    }

    /// Engine over the demo incidents, indicators, users and rules.
    pub(crate) fn seeded(config: &AnalysisConfig, now: DateTime<Utc>) -> Self {
        let store = InMemoryIncidentStore::with_data(demo_incidents(now), demo_indicators(now));
        let inbox = InMemoryNotificationStore::new(demo_rules(), demo_users());
        Self::new(store, inbox, config)
    }
}

struct Seed {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    location: &'static str,
    region: &'static str,
    state: &'static str,
    category: &'static str,
    severity: Severity,
    status: IncidentStatus,
    verification: VerificationStatus,
    hours_ago: i64,
}

const DEMO_SEEDS: &[Seed] = &[
    Seed {
        id: "ne-1",
        title: "Checkpoint harassment",
        description: "Armed group harassed travellers at a checkpoint",
        location: "Konduga",
        region: "North East",
        state: "Borno",
        category: "terrorism",
        severity: Severity::Low,
        status: IncidentStatus::Active,
        verification: VerificationStatus::Verified,
        hours_ago: 240,
    },
    Seed {
        id: "ne-2",
        title: "Village raid",
        description: "Insurgents raided a village and burned houses",
        location: "Bama",
        region: "North East",
        state: "Borno",
        category: "terrorism",
        severity: Severity::Medium,
        status: IncidentStatus::Active,
        verification: VerificationStatus::Verified,
        hours_ago: 168,
    },
    Seed {
        id: "ne-3",
        title: "Attack on military base",
        description: "Insurgents attacked a base, several soldiers killed",
        location: "Gwoza",
        region: "North East",
        state: "Borno",
        category: "terrorism",
        severity: Severity::High,
        status: IncidentStatus::Active,
        verification: VerificationStatus::Verified,
        hours_ago: 96,
    },
    Seed {
        id: "ne-4",
        title: "Market bombing",
        description: "Suicide bomber attacked a crowded market, many killed and wounded, families displaced",
        location: "Maiduguri",
        region: "North East",
        state: "Borno",
        category: "terrorism",
        severity: Severity::Critical,
        status: IncidentStatus::Active,
        verification: VerificationStatus::Unverified,
        hours_ago: 6,
    },
    Seed {
        id: "nc-1",
        title: "Farmland dispute",
        description: "Farmers and herders clashed over grazing land and water",
        location: "Bokkos",
        region: "North Central",
        state: "Plateau",
        category: "farmer_herder",
        severity: Severity::High,
        status: IncidentStatus::Active,
        verification: VerificationStatus::Verified,
        hours_ago: 300,
    },
    Seed {
        id: "nc-2",
        title: "Cattle rustling reprisal",
        description: "Herders attacked farmers after cattle were stolen from grazing land",
        location: "Agatu",
        region: "North Central",
        state: "Benue",
        category: "farmer_herder",
        severity: Severity::High,
        status: IncidentStatus::Active,
        verification: VerificationStatus::Verified,
        hours_ago: 200,
    },
    Seed {
        id: "nc-3",
        title: "Water point clash",
        description: "Dispute over water access turned violent between farmers and herders",
        location: "Riyom",
        region: "North Central",
        state: "Plateau",
        category: "farmer_herder",
        severity: Severity::Medium,
        status: IncidentStatus::Active,
        verification: VerificationStatus::Pending,
        hours_ago: 120,
    },
    Seed {
        id: "nw-1",
        title: "Bandit attack",
        description: "Bandits attacked a village and kidnapped residents",
        location: "Gusau",
        region: "North West",
        state: "Zamfara",
        category: "banditry",
        severity: Severity::High,
        status: IncidentStatus::Active,
        verification: VerificationStatus::Verified,
        hours_ago: 2,
    },
    Seed {
        id: "nw-2",
        title: "Highway kidnapping",
        description: "Gunmen kidnapped travellers on the highway",
        location: "Birnin Gwari",
        region: "North West",
        state: "Kaduna",
        category: "banditry",
        severity: Severity::High,
        status: IncidentStatus::Active,
        verification: VerificationStatus::Verified,
        hours_ago: 4,
    },
    Seed {
        id: "nw-3",
        title: "Farm attack",
        description: "Bandits attacked farmers and stole livestock",
        location: "Anka",
        region: "North West",
        state: "Zamfara",
        category: "banditry",
        severity: Severity::Medium,
        status: IncidentStatus::Active,
        verification: VerificationStatus::Unverified,
        hours_ago: 5,
    },
    Seed {
        id: "nw-4",
        title: "School raid",
        description: "Armed bandits raided a school, students abducted",
        location: "Kankara",
        region: "North West",
        state: "Katsina",
        category: "banditry",
        severity: Severity::Critical,
        status: IncidentStatus::Active,
        verification: VerificationStatus::Verified,
        hours_ago: 7,
    },
    Seed {
        id: "nw-5",
        title: "Market shooting",
        description: "Gunmen opened fire in a market, several killed",
        location: "Tsafe",
        region: "North West",
        state: "Zamfara",
        category: "banditry",
        severity: Severity::High,
        status: IncidentStatus::Active,
        verification: VerificationStatus::Verified,
        hours_ago: 9,
    },
    Seed {
        id: "sw-1",
        title: "Communal land dispute",
        description: "Communities disputed a land boundary",
        location: "Ife",
        region: "South West",
        state: "Osun",
        category: "communal",
        severity: Severity::Medium,
        status: IncidentStatus::Resolved,
        verification: VerificationStatus::Verified,
        hours_ago: 1_200,
    },
    Seed {
        id: "sw-2",
        title: "Youth clash",
        description: "Rival youth groups clashed before a dialogue meeting",
        location: "Modakeke",
        region: "South West",
        state: "Osun",
        category: "communal",
        severity: Severity::Low,
        status: IncidentStatus::Resolved,
        verification: VerificationStatus::Verified,
        hours_ago: 900,
    },
    Seed {
        id: "sw-3",
        title: "Peace agreement signed",
        description: "Community leaders signed a peace agreement after mediation and dialogue",
        location: "Ife",
        region: "South West",
        state: "Osun",
        category: "communal",
        severity: Severity::Low,
        status: IncidentStatus::Resolved,
        verification: VerificationStatus::Verified,
        hours_ago: 400,
    },
];

pub(crate) fn demo_incidents(now: DateTime<Utc>) -> Vec<IncidentRow> {
    let mut rows: Vec<IncidentRow> = DEMO_SEEDS
        .iter()
        .map(|seed| {
            let reported_at = now - Duration::hours(seed.hours_ago);
            let record = IncidentRecord {
                id: IncidentId(seed.id.to_string()),
                title: seed.title.to_string(),
                description: seed.description.to_string(),
                location: seed.location.to_string(),
                region: seed.region.to_string(),
                state: Some(seed.state.to_string()),
                category: seed.category.to_string(),
                severity: seed.severity,
                status: seed.status,
                verification_status: seed.verification,
                reported_at,
                impacted_population: None,
                resolved_at: (seed.status == IncidentStatus::Resolved)
                    .then(|| reported_at + Duration::hours(72)),
            };
            IncidentRow::from(&record)
        })
        .collect();

    // incomplete field report kept for the data quality scan
    rows.push(IncidentRow {
        id: Some("field-17".to_string()),
        title: Some("Unconfirmed gunfire".to_string()),
        region: Some("South South".to_string()),
        category: Some("cult_clash".to_string()),
        severity: Some("severe".to_string()),
        status: Some("active".to_string()),
        reported_at: Some(now - Duration::hours(30)),
        ..IncidentRow::default()
    });
    rows
}

pub(crate) fn demo_indicators(now: DateTime<Utc>) -> Vec<RiskIndicatorRecord> {
    let reading = |id: &str, name: &str, region: &str, value: f64, hours_ago: i64| {
        RiskIndicatorRecord {
            id: id.to_string(),
            name: name.to_string(),
            region: region.to_string(),
            value,
            timestamp: now - Duration::hours(hours_ago),
        }
    };

    vec![
        reading("ri-1", "displacement pressure", "North East", 92.0, 12),
        reading("ri-2", "food insecurity", "North East", 71.0, 20),
        reading("ri-3", "kidnapping frequency", "North West", 84.0, 3),
        reading("ri-4", "small arms circulation", "North West", 66.0, 30),
        reading("ri-5", "grazing route tension", "North Central", 78.0, 48),
        reading("ri-6", "grazing route tension", "North Central", 58.0, 6),
        reading("ri-7", "election violence risk", "South West", 22.0, 72),
    ]
}

pub(crate) fn demo_users() -> Vec<UserRecord> {
    let user = |id: &str, name: &str, role: UserRole, security_level: u8| UserRecord {
        id: id.to_string(),
        name: name.to_string(),
        role,
        security_level,
        active: true,
    };

    vec![
        user("u-admin", "Operations Admin", UserRole::Admin, 9),
        user("u-supervisor", "Regional Supervisor", UserRole::Supervisor, 7),
        user("u-analyst", "Conflict Analyst", UserRole::Analyst, 5),
        user("u-field", "Field Officer", UserRole::FieldOfficer, 3),
        user("u-viewer", "Partner Viewer", UserRole::Viewer, 1),
    ]
}

pub(crate) fn demo_rules() -> Vec<NotificationRule> {
    vec![
        NotificationRule {
            id: "rule-critical-incidents".to_string(),
            name: "Critical incidents to supervisors".to_string(),
            enabled: true,
            event: NotificationEvent::IncidentCreated,
            conditions: Some(NotificationConditions {
                severity_in: Some(vec!["critical".to_string(), "high".to_string()]),
                ..NotificationConditions::default()
            }),
            actions: NotificationActions {
                notify_roles: vec![UserRole::Supervisor, UserRole::Analyst],
                notification_type: NotificationType::Critical,
                title_template: Some("{{severity}} incident: {{title}}".to_string()),
                message_template: Some(
                    "{{title}} reported in {{location}}, {{region}}.".to_string(),
                ),
                ..NotificationActions::default()
            },
        },
        NotificationRule {
            id: "rule-escalated-alerts".to_string(),
            name: "Escalated alerts to administrators".to_string(),
            enabled: true,
            event: NotificationEvent::AlertCreated,
            conditions: Some(NotificationConditions {
                escalation_level_gte: Some(3),
                ..NotificationConditions::default()
            }),
            actions: NotificationActions {
                notify_roles: vec![UserRole::Admin],
                notify_user_ids: vec!["u-supervisor".to_string()],
                notification_type: NotificationType::Warning,
                ..NotificationActions::default()
            },
        },
    ]
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// End of the given day, or now when no date is supplied.
pub(crate) fn as_of(date: Option<NaiveDate>) -> DateTime<Utc> {
    date.and_then(|date| date.and_hms_opt(23, 59, 59))
        .map(|dt| dt.and_utc())
        .unwrap_or_else(Utc::now)
}

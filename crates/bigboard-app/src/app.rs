// Application state: the loaded dataset plus the collaborators every view and
// scouting session shares.
//
// Startup sequence (`BigBoardApp::start`):
// 1. Copy missing defaults into `config/`
// 2. Install file logging under `logs/`
// 3. Load and validate config, rooting relative paths at the base dir
// 4. Load the dataset named by `[data]`
// 5. Open the report store selected by `[storage]`
// 6. Build the summary client selected by `[summary]`

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use tracing::{info, warn};

use bigboard_core::config::{self, Config};
use bigboard_core::dataset::{Dataset, PlayerId};
use bigboard_core::report::ScoutingReport;
use bigboard_core::store::ReportStore;
use bigboard_llm::client::{SummaryClient, SummaryService};
use bigboard_nba::ranking::{self, BoardEntry, BoardFilter, CompareList, CompareToggle, RankMode};
use bigboard_nba::stats::{GameSort, StatMode};

use crate::logging::init_tracing;
use crate::profile::{self, ComparisonView, GameLogView, PlayerProfile};
use crate::session::ScoutingSession;

pub struct BigBoardApp {
    pub config: Config,
    pub dataset: Arc<Dataset>,
    pub store: ReportStore,
    summaries: Arc<dyn SummaryService>,
    /// Ordering used by `board`. Starts from `board.default_sort`.
    pub rank_mode: RankMode,
    pub compare: CompareList,
}

impl BigBoardApp {
    /// Full startup rooted at `base_dir`, which holds `defaults/` and/or
    /// `config/`. Logging failures are reported and do not stop startup.
    pub fn start(base_dir: &Path) -> anyhow::Result<Self> {
        let copied = config::ensure_config_files(base_dir).context("failed to prepare config directory")?;

        if let Err(e) = init_tracing(&base_dir.join("logs")) {
            warn!("File logging unavailable: {e:#}");
        }
        for path in &copied {
            info!("Copied default config to {}", path.display());
        }

        let mut config = config::load_config_from(base_dir).context("failed to load configuration")?;
        config.data.dataset_path = rooted(base_dir, &config.data.dataset_path);
        if let Some(db_path) = config.storage.db_path.take() {
            config.storage.db_path = Some(rooted(base_dir, &db_path));
        }
        info!(
            "Configuration loaded: dataset={}, storage={:?}, summary={:?}",
            config.data.dataset_path, config.storage.backend, config.summary.provider
        );

        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let dataset = Dataset::load(Path::new(&config.data.dataset_path))
            .context("failed to load dataset")?;
        let store = ReportStore::from_config(&config).context("failed to open report store")?;

        let summaries = SummaryClient::from_config(&config);
        if !summaries.is_enabled() {
            info!("Summary client disabled; reports get local summaries only");
        }

        Ok(Self::new(config, dataset, store, Arc::new(summaries)))
    }

    pub fn new(config: Config, dataset: Dataset, store: ReportStore, summaries: Arc<dyn SummaryService>) -> Self {
        let rank_mode = RankMode::parse(&config.board.default_sort);
        Self {
            config,
            dataset: Arc::new(dataset),
            store,
            summaries,
            rank_mode,
            compare: CompareList::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Board
    // -----------------------------------------------------------------------

    pub fn board(&self, filter: &BoardFilter) -> Vec<BoardEntry<'_>> {
        ranking::big_board(&self.dataset, filter, &self.rank_mode)
    }

    pub fn set_rank_mode(&mut self, mode: RankMode) {
        self.rank_mode = mode;
    }

    pub fn teams(&self) -> Vec<String> {
        ranking::teams(&self.dataset)
    }

    pub fn leagues(&self) -> Vec<String> {
        ranking::leagues(&self.dataset)
    }

    pub fn scouts(&self) -> Vec<String> {
        ranking::scouts(&self.dataset)
    }

    // -----------------------------------------------------------------------
    // Player views
    // -----------------------------------------------------------------------

    pub fn profile(&self, id: PlayerId, stat_mode: StatMode, today: NaiveDate) -> Option<PlayerProfile<'_>> {
        profile::player_profile(&self.dataset, id, &self.rank_mode, stat_mode, today)
    }

    pub fn game_logs(&self, id: PlayerId, season: Option<i32>, sort: Option<GameSort>) -> GameLogView<'_> {
        profile::game_log_view(&self.dataset, id, season, sort)
    }

    pub fn toggle_compare(&mut self, id: PlayerId) -> CompareToggle {
        self.compare.toggle(id)
    }

    pub fn comparison(&self) -> ComparisonView<'_> {
        profile::comparison_view(&self.dataset, &self.compare)
    }

    // -----------------------------------------------------------------------
    // Scouting reports
    // -----------------------------------------------------------------------

    /// A fresh drafting session for `player_id`, sharing this app's store and
    /// summary client.
    pub fn session(&self, player_id: PlayerId) -> ScoutingSession {
        ScoutingSession::new(player_id, self.store.clone(), Arc::clone(&self.summaries))
    }

    pub fn reports(&self, player_id: PlayerId) -> Vec<ScoutingReport> {
        self.store.list(player_id)
    }
}

fn rooted(base_dir: &Path, path: &str) -> String {
    let path = Path::new(path);
    if path.is_absolute() {
        path.display().to_string()
    } else {
        base_dir.join(path).display().to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use bigboard_core::config::{
        BoardConfig, CredentialsConfig, DataConfig, StorageConfig, StorageKind, SummaryConfig,
        SummaryProvider,
    };
    use bigboard_core::report::{Ceiling, DraftRange, ProjectedRole, ReportTag};
    use bigboard_nba::ranking::MAX_COMPARE;
    use std::path::PathBuf;

    const DATASET: &str = r#"{
        "bio": [
            {"playerId": 1, "name": "Unranked Guy", "currentTeam": "Duke", "league": "NCAA"},
            {"playerId": 2, "name": "Top Pick", "currentTeam": "Duke", "league": "NCAA"},
            {"playerId": 3, "name": "Second Pick", "currentTeam": "Rutgers", "league": "NCAA"}
        ],
        "scoutRankings": [
            {"playerId": 2, "ESPN Rank": 1, "Ringer Rank": 2},
            {"playerId": 3, "ESPN Rank": 3, "Ringer Rank": 1}
        ]
    }"#;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bigboard_app_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn config(dataset_path: &Path, default_sort: &str) -> Config {
        Config {
            data: DataConfig {
                dataset_path: dataset_path.display().to_string(),
            },
            storage: StorageConfig {
                backend: StorageKind::Memory,
                db_path: None,
            },
            summary: SummaryConfig {
                provider: SummaryProvider::Local,
                endpoint: None,
                model: "claude-sonnet-4-5-20250929".into(),
                max_tokens: 300,
            },
            board: BoardConfig {
                default_sort: default_sort.into(),
            },
            credentials: CredentialsConfig::default(),
        }
    }

    fn app(name: &str, default_sort: &str) -> BigBoardApp {
        let dir = scratch(name);
        let path = dir.join("dataset.json");
        std::fs::write(&path, DATASET).unwrap();
        BigBoardApp::from_config(config(&path, default_sort)).unwrap()
    }

    fn ids(entries: &[BoardEntry<'_>]) -> Vec<PlayerId> {
        entries.iter().map(|e| e.player.player_id).collect()
    }

    #[test]
    fn from_config_loads_dataset_and_orders_board() {
        let app = app("board", "average");
        assert_eq!(app.rank_mode, RankMode::Average);
        assert_eq!(ids(&app.board(&BoardFilter::default())), vec![2, 3, 1]);
        assert_eq!(app.teams(), vec!["Duke", "Rutgers"]);
        assert_eq!(app.scouts(), vec!["ESPN Rank", "Ringer Rank"]);
    }

    #[test]
    fn default_sort_can_name_a_scout() {
        let mut app = app("scout_sort", "Ringer Rank");
        assert_eq!(ids(&app.board(&BoardFilter::default())), vec![3, 2, 1]);

        app.set_rank_mode(RankMode::Average);
        assert_eq!(ids(&app.board(&BoardFilter::default())), vec![2, 3, 1]);
    }

    #[test]
    fn missing_dataset_is_an_error() {
        let dir = scratch("missing");
        let err = BigBoardApp::from_config(config(&dir.join("nope.json"), "average"))
            .err()
            .expect("missing dataset should fail");
        assert!(format!("{err:#}").contains("failed to load dataset"));
    }

    #[test]
    fn compare_selection_is_capped() {
        let mut app = app("compare", "average");
        for id in 1..=MAX_COMPARE as PlayerId {
            assert_eq!(app.toggle_compare(id), CompareToggle::Added);
        }
        assert_eq!(app.toggle_compare(99), CompareToggle::Full);
        assert_eq!(app.comparison().players.len(), MAX_COMPARE);
    }

    #[test]
    fn start_copies_defaults_and_roots_relative_paths() {
        let base = scratch("start");
        std::fs::create_dir_all(base.join("defaults")).unwrap();
        std::fs::create_dir_all(base.join("data")).unwrap();
        std::fs::write(base.join("data/board.json"), DATASET).unwrap();
        std::fs::write(
            base.join("defaults/bigboard.toml"),
            r#"
[data]
dataset_path = "data/board.json"

[storage]
backend = "memory"

[summary]
provider = "local"
model = "claude-sonnet-4-5-20250929"
max_tokens = 300

[board]
default_sort = "Ringer Rank"
"#,
        )
        .unwrap();

        let app = BigBoardApp::start(&base).unwrap();
        assert!(base.join("config/bigboard.toml").exists());
        assert_eq!(
            PathBuf::from(&app.config.data.dataset_path),
            base.join("data/board.json")
        );
        assert_eq!(ids(&app.board(&BoardFilter::default())), vec![3, 2, 1]);

        let _ = std::fs::remove_dir_all(&base);
    }

    #[test]
    fn start_without_config_is_an_error() {
        let base = scratch("start_empty");
        let err = BigBoardApp::start(&base).err().expect("no config should fail");
        assert!(format!("{err:#}").contains("failed to prepare config directory"));
    }

    #[test]
    fn rooted_keeps_absolute_paths() {
        let base = Path::new("/srv/board");
        assert_eq!(rooted(base, "/data/x.json"), "/data/x.json");
        assert_eq!(PathBuf::from(rooted(base, "data/x.json")), base.join("data/x.json"));
    }

    #[tokio::test]
    async fn sessions_share_the_store() {
        let app = app("sessions", "average");
        let mut session = app.session(2);
        {
            let form = session.form_mut();
            form.report_tag = Some(ReportTag::PreDraft);
            form.strengths = "Elite athlete".into();
            form.weaknesses = "Turnovers".into();
            form.intangibles = "Competitor".into();
            form.comparison = "Jaylen Brown".into();
            form.fit = "Wing".into();
            form.role = Some(ProjectedRole::Starter);
            form.ceiling = Some(Ceiling::AllStar);
            form.range = Some(DraftRange::Lottery);
        }
        let saved = session.submit().await.unwrap();
        assert!(saved.summary.is_some());

        let reports = app.reports(2);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].id, saved.id);
        assert!(app.reports(3).is_empty());
    }
}

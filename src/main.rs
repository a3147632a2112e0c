use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use phantom_console::core::Value;
use phantom_console::storage::Filter;
use phantom_console::storage::schema::{ACCOUNTS, CHARACTERS, ITEMS, create_game_schema};
use phantom_console::{
    ActorId, ClassCatalog, ConsoleConfig, ConsoleView, Database, FakeRow, LiveRegistry,
    NameRegistry, PhantomConsole, PointCatalog, PointKind, Position, SimulatedWorld, WorldRuntime,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "phantom")]
#[command(about = "Operator console for automated player actors")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Seed a world and walk one character through load, spawn and delete
    Demo {
        #[arg(long, default_value_t = 3)]
        bots: u32,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run the console service and print every published view
    Watch {
        #[arg(long, default_value_t = 10)]
        seconds: u64,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List teleport points by kind
    Points,
}

const SCENARIO_ID: i64 = 5001;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Demo { bots, config } => {
            let config = load_config(config.as_deref())?;
            init_tracing(&config);
            demo(config, bots).await
        }
        Command::Watch { seconds, config } => {
            let config = load_config(config.as_deref())?;
            init_tracing(&config);
            watch(config, Duration::from_secs(seconds)).await
        }
        Command::Points => {
            list_points();
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ConsoleConfig> {
    match path {
        Some(path) => ConsoleConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ConsoleConfig::default()),
    }
}

fn init_tracing(config: &ConsoleConfig) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn seeded_world(bots: u32) -> Result<(Database, Arc<SimulatedWorld>)> {
    let db = Database::new();
    create_game_schema(&db).await?;

    seed_character(&db, "AutoPilot_7", SCENARIO_ID, "Bot5001", 0, 40, Position::new(10, 20, 30)).await?;
    db.insert(ITEMS, vec![Value::Integer(900_001), Value::from(SCENARIO_ID), Value::Integer(57), Value::Integer(1_000)])
        .await?;
    db.insert("pets", vec![Value::Integer(900_001), "Wolfie".into(), Value::Integer(15)])
        .await?;
    db.insert("character_friends", vec![Value::Integer(5002), Value::from(SCENARIO_ID)])
        .await?;

    let classes = ClassCatalog::default();
    let class_count = classes.all().count() as i64;
    for n in 0..bots as i64 {
        let id = 6000 + n;
        seed_character(
            &db,
            &format!("AutoPilot_{}", id),
            id,
            &format!("Bot{}", id),
            (n * 7) % class_count,
            20 + n,
            Position::new(83_000 + n as i32 * 10, 148_000, -3_400),
        )
        .await?;
    }

    // A real player, which must never show up as a fake row.
    db.insert(ACCOUNTS, vec!["player1".into(), Value::Integer(0)]).await?;
    db.insert(
        CHARACTERS,
        vec![
            Value::Integer(7000),
            "player1".into(),
            "RealHero".into(),
            Value::Integer(0),
            Value::Integer(76),
            0.into(),
            0.into(),
            0.into(),
        ],
    )
    .await?;

    let world = SimulatedWorld::new(db.clone(), LiveRegistry::new(), NameRegistry::new());
    for class in world.classes().all() {
        world.register_controller(class, "FARMING").await;
    }
    Ok((db, Arc::new(world)))
}

async fn seed_character(
    db: &Database,
    account: &str,
    id: i64,
    name: &str,
    class_id: i64,
    level: i64,
    at: Position,
) -> Result<()> {
    db.insert(ACCOUNTS, vec![account.into(), Value::Integer(-1)]).await?;
    db.insert(
        CHARACTERS,
        vec![
            Value::Integer(id),
            account.into(),
            name.into(),
            Value::Integer(class_id),
            Value::Integer(level),
            at.x.into(),
            at.y.into(),
            at.z.into(),
        ],
    )
    .await?;
    Ok(())
}

fn print_rows(title: &str, rows: &[FakeRow]) {
    println!("\n== {} ({} rows) ==", title, rows.len());
    println!(
        "{:<10} {:<14} {:<20} {:>5} {:<8} {:<10} {}",
        "ID", "NAME", "CLASS", "LVL", "ONLINE", "STATE", "POSITION"
    );
    for row in rows {
        println!(
            "{:<10} {:<14} {:<20} {:>5} {:<8} {:<10} {}",
            row.id,
            row.name,
            row.class_display(),
            row.level,
            row.online,
            row.state_label,
            row.position
        );
    }
}

async fn demo(config: ConsoleConfig, bots: u32) -> Result<()> {
    let (db, world) = seeded_world(bots).await?;
    let runtime: Arc<dyn WorldRuntime> = world.clone();
    let console = PhantomConsole::new(config, db.clone(), runtime)?;
    let points = PointCatalog::default();
    let giran = points.by_name("Giran Town");
    let target = [ActorId(SCENARIO_ID)];

    print_rows("persisted", &console.load_all_rows().await);

    let spawned = console.spawn_pinned(&target, giran, 0).await?;
    println!("\nSPAWN PINNED OK: {} restored/spawned.", spawned);
    print_rows("after spawn", &console.load_all_rows().await);

    let matching = console.filter(&console.load_all_rows().await, Some("bot50"));
    print_rows("filter 'bot50'", &matching);

    let deleted = console.delete_batch(&target).await?;
    println!("\nDELETE DB PINNED OK: {}", deleted);
    print_rows("after delete", &console.load_all_rows().await);

    let account_left = db
        .count(ACCOUNTS, &Filter::eq("login", "AutoPilot_7"))
        .await?;
    println!("\naccount AutoPilot_7 rows left: {}", account_left);
    println!("world events: {}", world.events().await.len());
    Ok(())
}

async fn watch(config: ConsoleConfig, duration: Duration) -> Result<()> {
    let (db, world) = seeded_world(2).await?;
    let radius = config.default_radius;
    let console = PhantomConsole::new(config, db, world.clone())?;
    let service = console.start();
    let handle = service.handle();

    let points = PointCatalog::default();
    let farm = points.of_kind(PointKind::Farm).next().cloned();
    let class = world.classes().by_name("cleric");
    let _ = handle.create(farm.clone(), class, 3, radius);
    handle.refresh_now();

    let mut views = handle.subscribe();
    let deadline = tokio::time::Instant::now() + duration;
    let mut spawned = false;
    while let Ok(Ok(())) = tokio::time::timeout_at(deadline, views.changed()).await {
        let view = views.borrow_and_update().clone();
        print_view(&view);

        if !spawned && view.commands_enabled {
            spawned = true;
            handle.select_filtered();
            let _ = handle.spawn_pinned(farm.clone(), radius);
        }
    }

    service.shutdown().await;
    Ok(())
}

fn print_view(view: &ConsoleView) {
    println!(
        "[gen {}] online={} offline={} page {}/{} pinned={} status={}",
        view.generation,
        view.counts.online,
        view.counts.offline,
        view.page + 1,
        view.pages,
        view.pinned.len(),
        view.status.as_deref().unwrap_or("-")
    );
    for row in &view.rows {
        println!(
            "  {} {:<8} {:<10} {:<14} {:<20} {}",
            if row.pinned { "[x]" } else { "[ ]" },
            row.badge,
            row.id,
            row.name,
            row.class,
            row.state
        );
    }
}

fn list_points() {
    let points = PointCatalog::default();
    for kind in [PointKind::Town, PointKind::Farm, PointKind::Pvp] {
        println!("{}", kind);
        for point in points.of_kind(kind) {
            println!("  {:<16} {}", point.name, point.base);
        }
    }
}

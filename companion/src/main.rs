use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use arcade::{CATALOG, GameId};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use engine::Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use companion::play;
use lifestyle::anniversary::{Anniversaries, AnniversaryDraft, status_label};
use lifestyle::diary::Diary;
use lifestyle::elf::ElfClient;
use lifestyle::friend::{Friends, invite_link};
use lifestyle::ledger::Ledger;
use lifestyle::moments::{Author, Moments};
use lifestyle::movies::{MediaKind, MovieDraft, MovieFilter, Watchlist};
use lifestyle::profile::Profile;
use lifestyle::roulette::{Roulette, Wheel};
use lifestyle::schedule::{Planner, ScheduleDraft, week_dates};
use lifestyle::timestamp::{self, format_minute};
use lifestyle::weather::WeatherClient;
use lifestyle::{CompanionSettings, EventBus, FileStore, SettingsStore};

const LOG_ENV: &str = "COMPANION_LOG";

#[derive(Debug, Parser)]
#[command(name = "companion")]
#[command(about = "Shared records, a chat elf and a few games for two")]
struct Cli {
    /// Store file, overriding the one named in settings.
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the balance, or set it when an amount is given.
    Balance { amount: Option<f64> },
    #[command(subcommand)]
    Expense(ExpenseCmd),
    #[command(subcommand)]
    Schedule(ScheduleCmd),
    #[command(subcommand)]
    Anniversary(AnniversaryCmd),
    #[command(subcommand)]
    Diary(DiaryCmd),
    #[command(subcommand)]
    Movie(MovieCmd),
    #[command(subcommand)]
    Moment(MomentCmd),
    #[command(subcommand)]
    Friend(FriendCmd),
    /// Print an invitation link for the logged-in phone.
    Invite,
    Login {
        phone: String,
        code: String,
    },
    Logout,
    /// Show the profile; flags update it.
    Profile {
        #[arg(long)]
        nickname: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        met_at: Option<String>,
    },
    #[command(subcommand)]
    Roulette(RouletteCmd),
    /// Ask the elf assistant.
    Elf {
        #[arg(required = true)]
        message: Vec<String>,
    },
    Weather,
    /// List the games.
    Games,
    /// Run a game headlessly from an input script and print the board.
    Play {
        game: GameId,
        #[arg(long, default_value_t = 1)]
        seed: u64,
        #[arg(long, default_value = "")]
        inputs: String,
    },
}

#[derive(Debug, Subcommand)]
enum ExpenseCmd {
    Add {
        name: String,
        amount: f64,
        /// YYYY-MM-DD HH:mm, defaults to now.
        #[arg(long)]
        at: Option<String>,
    },
    List,
    Edit {
        id: String,
        name: String,
        amount: f64,
        #[arg(long)]
        at: Option<String>,
    },
    Delete {
        id: String,
    },
    Summary,
}

#[derive(Debug, Subcommand)]
enum ScheduleCmd {
    Add {
        title: String,
        /// YYYY-MM-DD
        date: String,
        /// HH:MM
        time: String,
        #[arg(long, default_value_t = 60)]
        duration: u32,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// One day's entries, today by default, with the week strip.
    List {
        date: Option<String>,
    },
    History,
    Delete {
        id: String,
    },
}

#[derive(Debug, Subcommand)]
enum AnniversaryCmd {
    Add {
        name: String,
        date: String,
        /// Pin to the top, unpinning any other.
        #[arg(long)]
        pin: bool,
    },
    List,
    Top {
        id: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, Subcommand)]
enum DiaryCmd {
    Write {
        html: String,
        #[arg(long)]
        date: Option<String>,
    },
    Show {
        #[arg(long)]
        date: Option<String>,
    },
    History,
}

#[derive(Debug, Subcommand)]
enum MovieCmd {
    List {
        /// movie or tv
        #[arg(long)]
        kind: Option<String>,
    },
    Add {
        title: String,
        year: i32,
        genre: String,
        description: String,
        #[arg(long)]
        tv: bool,
        #[arg(long, default_value = "")]
        poster: String,
        #[arg(long, default_value_t = 8.0)]
        rating: f32,
        #[arg(long, default_value = "")]
        duration: String,
    },
    Watched {
        id: String,
    },
    Share {
        id: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, Subcommand)]
enum MomentCmd {
    Post {
        #[arg(default_value = "")]
        text: String,
        #[arg(long)]
        image: Option<String>,
    },
    List {
        #[arg(long)]
        search: Option<String>,
    },
    Like {
        id: String,
    },
    Comment {
        id: String,
        text: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, Subcommand)]
enum FriendCmd {
    Add {
        phone: String,
        #[arg(long, default_value = "")]
        nickname: String,
    },
    Show,
    Send {
        text: String,
        /// Record the message as written by the friend.
        #[arg(long)]
        as_friend: bool,
    },
    Log,
    Remove,
    Accept {
        link: String,
    },
}

#[derive(Debug, Subcommand)]
enum RouletteCmd {
    List,
    Add {
        text: String,
    },
    Remove {
        id: String,
    },
    Spin {
        #[arg(long)]
        seed: Option<u64>,
    },
    Config {
        #[arg(long)]
        duration: Option<f64>,
        #[arg(long)]
        speed: Option<f64>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = SettingsStore::from_env().load();
    let store_path = cli.store.unwrap_or_else(|| settings.data.store_path.clone());
    let mut store = FileStore::open(&store_path);
    let events = EventBus::new();
    info!(store = %store_path.display(), "companion started");

    match cli.command {
        Commands::Balance { amount } => cmd_balance(&mut store, amount),
        Commands::Expense(cmd) => cmd_expense(&mut store, cmd),
        Commands::Schedule(cmd) => cmd_schedule(&mut store, cmd),
        Commands::Anniversary(cmd) => cmd_anniversary(&mut store, events, cmd),
        Commands::Diary(cmd) => cmd_diary(&mut store, cmd),
        Commands::Movie(cmd) => cmd_movie(&mut store, cmd),
        Commands::Moment(cmd) => cmd_moment(&mut store, cmd),
        Commands::Friend(cmd) => cmd_friend(&mut store, events, cmd),
        Commands::Invite => {
            let phone = Profile::new(&mut store)
                .user_phone()
                .ok_or_else(|| anyhow!("log in first to create an invitation link"))?;
            let base = &settings.invite.base_url;
            let link = invite_link(base, &phone)
                .with_context(|| format!("invalid invite base url '{base}'"))?;
            println!("{link}");
            Ok(())
        }
        Commands::Login { phone, code } => {
            let phone = Profile::new(&mut store).login(&phone, &code)?;
            info!("logged in");
            println!("Logged in as {}", lifestyle::profile::mask_phone(&phone).unwrap_or(phone));
            Ok(())
        }
        Commands::Logout => {
            Profile::new(&mut store).logout()?;
            println!("Logged out");
            Ok(())
        }
        Commands::Profile {
            nickname,
            avatar,
            met_at,
        } => cmd_profile(&mut store, events, nickname, avatar, met_at),
        Commands::Roulette(cmd) => cmd_roulette(&mut store, cmd),
        Commands::Elf { message } => cmd_elf(&settings, &message.join(" ")),
        Commands::Weather => cmd_weather(&settings),
        Commands::Games => {
            for game in &CATALOG {
                let mode = if game.id.is_realtime() { "timed" } else { "turns" };
                println!("{:<8} {:<11} {:<6} {}", game.id.as_str(), game.name, mode, game.description);
            }
            Ok(())
        }
        Commands::Play { game, seed, inputs } => {
            let report = play(game, seed, &inputs).context("invalid input script")?;
            println!("{}", report.board);
            if report.over {
                println!("(game over after {} steps)", report.frame);
            }
            Ok(())
        }
    }
}

fn parse_date_arg(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(raw) => timestamp::parse_date(raw)
            .ok_or_else(|| anyhow!("invalid date '{raw}', expected YYYY-MM-DD")),
        None => Ok(timestamp::today()),
    }
}

fn parse_minute_arg(raw: Option<&str>) -> Result<Option<NaiveDateTime>> {
    raw.map(|raw| {
        timestamp::parse_minute(raw)
            .ok_or_else(|| anyhow!("invalid timestamp '{raw}', expected YYYY-MM-DD HH:mm"))
    })
    .transpose()
}

fn parse_time_arg(raw: &str) -> Result<NaiveTime> {
    timestamp::parse_time(raw).ok_or_else(|| anyhow!("invalid time '{raw}', expected HH:MM"))
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("failed to start async runtime")
}

fn cmd_balance(store: &mut FileStore, amount: Option<f64>) -> Result<()> {
    let mut ledger = Ledger::new(store);
    if let Some(amount) = amount {
        ledger.set_balance(amount)?;
        info!(amount, "balance set");
    }
    match ledger.balance() {
        Some(balance) => println!("Balance: {balance:.2}"),
        None => println!("No balance set"),
    }
    Ok(())
}

fn cmd_expense(store: &mut FileStore, cmd: ExpenseCmd) -> Result<()> {
    let mut ledger = Ledger::new(store);
    match cmd {
        ExpenseCmd::Add { name, amount, at } => {
            let when = parse_minute_arg(at.as_deref())?.unwrap_or_else(timestamp::now);
            let item = ledger.add_expense(&name, amount, when)?;
            info!(id = %item.id, "expense added");
            println!("{}", item.id);
        }
        ExpenseCmd::List => {
            let balance = ledger.balance().unwrap_or(0.0);
            for item in ledger.expenses() {
                println!(
                    "{}  {}  {:<16} {:>10.2}  (balance after: {:.2})",
                    item.id,
                    format_minute(&item.date),
                    item.name,
                    item.amount,
                    item.remaining(balance)
                );
            }
        }
        ExpenseCmd::Edit {
            id,
            name,
            amount,
            at,
        } => {
            let date = parse_minute_arg(at.as_deref())?;
            ledger.edit_expense(&id, &name, amount, date)?;
            println!("Updated {id}");
        }
        ExpenseCmd::Delete { id } => {
            if !ledger.delete_expense(&id)? {
                println!("No expense {id}");
            }
        }
        ExpenseCmd::Summary => {
            let summary = ledger.summary(timestamp::today());
            println!("Today: {:.2}", summary.today);
            println!("Week:  {:.2}", summary.week);
            println!("Month: {:.2}", summary.month);
        }
    }
    Ok(())
}

fn cmd_schedule(store: &mut FileStore, cmd: ScheduleCmd) -> Result<()> {
    let mut planner = Planner::new(store);
    match cmd {
        ScheduleCmd::Add {
            title,
            date,
            time,
            duration,
            description,
        } => {
            let date = parse_date_arg(Some(date.as_str()))?;
            let draft = ScheduleDraft::new(title, date, parse_time_arg(&time)?)
                .with_duration(duration)
                .with_description(description);
            let item = planner.add(draft, timestamp::now())?;
            println!("{}", item.id);
        }
        ScheduleCmd::List { date } => {
            let day = parse_date_arg(date.as_deref())?;
            let strip: Vec<String> = week_dates(day)
                .iter()
                .map(|d| {
                    let label = d.format("%a %d").to_string();
                    if *d == day { format!("[{label}]") } else { label }
                })
                .collect();
            println!("{}", strip.join(" "));
            for item in planner.for_date(day) {
                println!(
                    "{}  {} +{}m  {}  {}",
                    item.id,
                    item.time.format(timestamp::TIME_FORMAT),
                    item.duration,
                    item.title,
                    item.description
                );
            }
        }
        ScheduleCmd::History => {
            for item in planner.history() {
                println!(
                    "{} {}  {}",
                    item.date,
                    item.time.format(timestamp::TIME_FORMAT),
                    item.title
                );
            }
        }
        ScheduleCmd::Delete { id } => {
            if !planner.delete(&id)? {
                println!("No schedule entry {id}");
            }
        }
    }
    Ok(())
}

fn cmd_anniversary(store: &mut FileStore, events: EventBus, cmd: AnniversaryCmd) -> Result<()> {
    let mut book = Anniversaries::new(store).with_events(events);
    let today = timestamp::today();
    match cmd {
        AnniversaryCmd::Add { name, date, pin } => {
            let mut draft = AnniversaryDraft::new(name, parse_date_arg(Some(date.as_str()))?);
            if pin {
                draft = draft.pinned();
            }
            let item = book.add(draft, timestamp::now())?;
            println!("{}", item.id);
        }
        AnniversaryCmd::List => {
            for item in book.all() {
                let pin = if item.is_top { "*" } else { " " };
                println!(
                    "{pin} {}  {}  {}  {}",
                    item.id,
                    item.date,
                    item.name,
                    status_label(item.date, today)
                );
            }
        }
        AnniversaryCmd::Top { id } => {
            if !book.set_top(&id, timestamp::now())? {
                println!("No anniversary {id}");
            }
        }
        AnniversaryCmd::Delete { id } => {
            if !book.delete(&id)? {
                println!("No anniversary {id}");
            }
        }
    }
    Ok(())
}

fn cmd_diary(store: &mut FileStore, cmd: DiaryCmd) -> Result<()> {
    let mut diary = Diary::new(store);
    match cmd {
        DiaryCmd::Write { html, date } => {
            let day = parse_date_arg(date.as_deref())?;
            diary.save(day, &html, timestamp::now())?;
            println!("Saved {day}");
        }
        DiaryCmd::Show { date } => {
            let day = parse_date_arg(date.as_deref())?;
            println!("{}", diary.html_for(day));
        }
        DiaryCmd::History => {
            for day in diary.history_dates() {
                println!("{day}");
            }
        }
    }
    Ok(())
}

fn cmd_movie(store: &mut FileStore, cmd: MovieCmd) -> Result<()> {
    let friend = match cmd {
        MovieCmd::Share { .. } => Friends::new(store)
            .friend()
            .map(|info| info.nickname.unwrap_or(info.phone)),
        _ => None,
    };
    let mut list = Watchlist::new(store);
    match cmd {
        MovieCmd::List { kind } => {
            list.seed_defaults(timestamp::now())?;
            let filter = match kind.as_deref() {
                None => MovieFilter::All,
                Some("movie") => MovieFilter::Only(MediaKind::Movie),
                Some("tv") => MovieFilter::Only(MediaKind::Tv),
                Some(other) => return Err(anyhow!("unknown kind '{other}', expected movie or tv")),
            };
            for item in list.filtered(filter) {
                let watched = if item.is_watched { "watched" } else { "" };
                let shared = if item.is_shared { "shared" } else { "" };
                println!(
                    "{}  {} ({})  {:.1}  {}  {watched} {shared}",
                    item.id, item.title, item.year, item.rating, item.genre
                );
            }
            println!("watched: {}  shared: {}", list.watched_count(), list.shared_count());
        }
        MovieCmd::Add {
            title,
            year,
            genre,
            description,
            tv,
            poster,
            rating,
            duration,
        } => {
            let kind = if tv { MediaKind::Tv } else { MediaKind::Movie };
            let draft = MovieDraft {
                genre,
                description,
                poster,
                rating,
                duration,
                ..MovieDraft::new(title, kind, year)
            };
            let item = list.add(draft, timestamp::now())?;
            println!("{}", item.id);
        }
        MovieCmd::Watched { id } => {
            let item = list.toggle_watched(&id)?;
            println!("{}: watched = {}", item.title, item.is_watched);
        }
        MovieCmd::Share { id } => {
            let item = list.share(&id, friend.as_deref())?;
            println!("Shared {} with {}", item.title, item.shared_with.unwrap_or_default());
        }
        MovieCmd::Delete { id } => {
            if !list.delete(&id)? {
                println!("No entry {id}");
            }
        }
    }
    Ok(())
}

fn cmd_moment(store: &mut FileStore, cmd: MomentCmd) -> Result<()> {
    let mut feed = Moments::new(store);
    let now = Utc::now();
    match cmd {
        MomentCmd::Post { text, image } => {
            let post = feed.publish(&text, image, now)?;
            println!("{}", post.id);
        }
        MomentCmd::List { search } => {
            let posts = match search {
                Some(keyword) => feed.search(&keyword, now),
                None => feed.posts(now),
            };
            for post in posts {
                let heart = if post.liked { "♥" } else { "♡" };
                println!(
                    "{}  {}  {:?}  {heart}{}  {}",
                    post.id,
                    post.created_at.format("%Y-%m-%d %H:%M"),
                    post.author,
                    post.likes,
                    post.text
                );
                for comment in post.comments {
                    println!("    {:?}: {}", comment.author, comment.text);
                }
            }
        }
        MomentCmd::Like { id } => {
            let post = feed.toggle_like(&id, now)?;
            println!("likes: {}", post.likes);
        }
        MomentCmd::Comment { id, text } => {
            feed.add_comment(&id, &text, now)?;
        }
        MomentCmd::Delete { id } => {
            if !feed.delete(&id, now)? {
                println!("No post {id}");
            }
        }
    }
    Ok(())
}

fn cmd_friend(store: &mut FileStore, events: EventBus, cmd: FriendCmd) -> Result<()> {
    let mut friends = Friends::new(store).with_events(events);
    match cmd {
        FriendCmd::Add { phone, nickname } => {
            let info = friends.add(&phone, &nickname)?;
            println!("Linked {}", info.nickname.unwrap_or(info.phone));
        }
        FriendCmd::Show => match friends.friend() {
            Some(info) => println!(
                "{}  {}",
                info.phone,
                info.nickname.as_deref().unwrap_or("(no nickname)")
            ),
            None => println!("No friend linked"),
        },
        FriendCmd::Send { text, as_friend } => {
            let author = if as_friend { Author::Friend } else { Author::Me };
            friends.send(author, &text, Utc::now())?;
        }
        FriendCmd::Log => {
            for message in friends.messages() {
                println!(
                    "[{}] {:?}: {}",
                    message.created_at.format("%m-%d %H:%M"),
                    message.author,
                    message.text
                );
            }
        }
        FriendCmd::Remove => {
            friends.remove()?;
            println!("Friend removed");
        }
        FriendCmd::Accept { link } => {
            let info = friends.accept_invite(&link)?;
            println!("Now linked with {}", info.nickname.unwrap_or(info.phone));
        }
    }
    Ok(())
}

fn cmd_profile(
    store: &mut FileStore,
    events: EventBus,
    nickname: Option<String>,
    avatar: Option<String>,
    met_at: Option<String>,
) -> Result<()> {
    let mut profile = Profile::new(store).with_events(events);
    if let Some(nickname) = nickname {
        profile.set_nickname(&nickname)?;
    }
    if let Some(avatar) = avatar {
        profile.set_avatar(&avatar)?;
    }
    if let Some(raw) = met_at {
        profile.set_met_at(parse_date_arg(Some(raw.as_str()))?)?;
    }

    let today = timestamp::today();
    println!("Nickname: {}", profile.nickname().unwrap_or_else(|| "(not set)".into()));
    println!(
        "Account:  {}",
        profile.masked_phone().unwrap_or_else(|| "not logged in".into())
    );
    println!("Together: day {}", profile.days_together(today));
    Ok(())
}

fn cmd_roulette(store: &mut FileStore, cmd: RouletteCmd) -> Result<()> {
    let mut roulette = Roulette::new(store);
    match cmd {
        RouletteCmd::List => {
            for item in roulette.items() {
                println!("{}  {}", item.id, item.text);
            }
            println!(
                "duration: {}s  speed: {}°/s",
                roulette.duration_secs(),
                roulette.speed()
            );
        }
        RouletteCmd::Add { text } => {
            let item = roulette.add_item(&text)?;
            println!("{}", item.id);
        }
        RouletteCmd::Remove { id } => {
            if !roulette.remove_item(&id)? {
                println!("No item {id}");
            }
        }
        RouletteCmd::Spin { seed } => {
            let items = roulette.items();
            let mut rng = seed.map_or_else(Rng::from_clock, Rng::new);
            let mut wheel = Wheel::new(roulette.speed());
            wheel.toggle();
            // Spin for the configured time plus up to a second of drift.
            let spin = Duration::from_secs_f64(roulette.duration_secs())
                + Duration::from_millis(rng.below(1000) as u64);
            wheel.advance(spin);
            let index = wheel
                .landed_index(items.len())
                .ok_or_else(|| anyhow!("the wheel has no items"))?;
            println!("{}", items[index].text);
        }
        RouletteCmd::Config { duration, speed } => {
            if let Some(duration) = duration {
                roulette.set_duration_secs(duration)?;
            }
            if let Some(speed) = speed {
                let stored = roulette.set_speed(speed)?;
                println!("speed: {stored}°/s");
            }
        }
    }
    Ok(())
}

fn cmd_elf(settings: &CompanionSettings, message: &str) -> Result<()> {
    let client = ElfClient::from_settings(&settings.chat).context("failed to build chat client")?;
    if !client.has_api_key() {
        info!(env = %settings.chat.api_key_env, "no chat api key, replying offline");
    }
    let reply = runtime()?.block_on(client.reply(message));
    println!("{reply}");
    Ok(())
}

fn cmd_weather(settings: &CompanionSettings) -> Result<()> {
    let client =
        WeatherClient::from_settings(&settings.weather).context("failed to build weather client")?;
    let summary = runtime()?.block_on(client.summary());
    println!("{summary}");
    Ok(())
}

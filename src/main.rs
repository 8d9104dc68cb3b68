mod app;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Args, Parser, Subcommand};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use election_map::config::{Config, DATA_ROOT_ENV, DEFAULT_DATA_ROOT};
use election_map::data::load_boundaries;
use election_map::election::aggregate::Denominator;
use election_map::election::RaceType;
use election_map::prep;
use ratatui::DefaultTerminal;
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[clap(name = "election-map", version, about = "US election results in the terminal")]
struct Opts {
    /// Data directory holding `results/` and `geo/`; prep steps write here
    #[clap(
        long,
        global = true,
        visible_alias = "out",
        env = DATA_ROOT_ENV,
        default_value = DEFAULT_DATA_ROOT
    )]
    data: PathBuf,
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Open the interactive map (the default)
    View(ViewArgs),
    /// Build the static result files
    Prep {
        #[clap(subcommand)]
        step: PrepStep,
    },
}

#[derive(Args, Default)]
struct ViewArgs {
    /// Year to open on
    #[clap(long)]
    year: Option<u16>,
    /// President, Senate, House or Governor
    #[clap(long)]
    race: Option<RaceType>,
    /// Skip county centroids on the national presidential map
    #[clap(long)]
    no_county_dots: bool,
    /// Where the viewer writes its log
    #[clap(long)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum PrepStep {
    /// Presidential national and state files, 1976-2024
    Presidential {
        /// Directory with the county-level returns CSVs
        #[clap(long)]
        input: PathBuf,
        /// Percentages against the itemized candidate sum instead of the reported total
        #[clap(long)]
        itemized: bool,
    },
    /// Add one House year from a candidate-level CSV
    House {
        /// District returns CSV
        #[clap(long)]
        csv: PathBuf,
        /// Election year the CSV covers
        #[clap(long)]
        year: u16,
        #[clap(long)]
        itemized: bool,
    },
    /// County centroid dots joined with the presidential state files
    CountyDots {
        /// County outlines; defaults to `geo/us-counties.geojson` under the data directory
        #[clap(long)]
        counties: Option<PathBuf>,
    },
    /// County breakdowns of House districts
    DistrictCounties {
        /// Per-county candidate votes, keyed by year and district
        #[clap(long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    let config = Config::default().with_data_root(opts.data);

    match opts.command {
        Some(Command::Prep { step }) => run_prep(step, config),
        Some(Command::View(args)) => view(args, config),
        None => view(ViewArgs::default(), config),
    }
}

fn run_prep(step: PrepStep, mut config: Config) -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match step {
        PrepStep::Presidential { input, itemized } => {
            if itemized {
                config.policy.denominator = Denominator::Itemized;
            }
            let out = prep::presidential::run(&input, &config)
                .with_context(|| format!("presidential prep from {}", input.display()))?;
            log::info!("{} years, {} state files", out.national.0.len(), out.states.len());
        }
        PrepStep::House { csv, year, itemized } => {
            if itemized {
                config.policy.denominator = Denominator::Itemized;
            }
            let data = prep::house::run(&csv, year, &config)
                .with_context(|| format!("house prep from {}", csv.display()))?;
            log::info!("{year}: {} districts", data.districts.len());
        }
        PrepStep::CountyDots { counties } => {
            let counties = counties.unwrap_or_else(|| config.counties_geo_path());
            let n = prep::dots::run(&counties, &config)
                .with_context(|| format!("county dots from {}", counties.display()))?;
            log::info!("{n} dots");
        }
        PrepStep::DistrictCounties { input } => {
            let n = prep::district_counties::run(&input, &config)
                .with_context(|| format!("district breakdowns from {}", input.display()))?;
            log::info!("{n} state files");
        }
    }
    Ok(())
}

fn view(args: ViewArgs, mut config: Config) -> Result<()> {
    if let Some(year) = args.year {
        config.start_year = year;
    }
    if let Some(race) = args.race {
        config.race = race;
    }
    if args.no_county_dots {
        config.county_dots = false;
    }
    if let Some(path) = args.log_file {
        config.log_file = path;
    }

    // The terminal owns stdout and stderr while the map is up
    let log = File::create(&config.log_file)
        .with_context(|| format!("creating log file {}", config.log_file.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log)))
        .init();
    log::info!("data root {}", config.data_root.display());

    let boundaries = load_boundaries(&config);

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    // Run the app
    let result = run(&mut terminal, config, boundaries);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Handle mouse events for panning, zooming, hover and selection
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Always track mouse position for cursor marker and hover
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        // Scroll wheel for zooming towards mouse position
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        // Drag to pan, click to select
        MouseEventKind::Down(MouseButton::Left) => app.begin_drag(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.end_drag(mouse.column, mouse.row),
        // Right click steps back out
        MouseEventKind::Down(MouseButton::Right) => app.back(),
        _ => {}
    }
}

fn handle_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Esc | KeyCode::Backspace => app.back(),

        // Pan with hjkl or arrow keys
        KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
        KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
        KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
        KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

        // Zoom
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

        // Year slider
        KeyCode::Char(',') | KeyCode::Char('[') => app.step_year(false),
        KeyCode::Char('.') | KeyCode::Char(']') => app.step_year(true),

        // Race tabs
        KeyCode::Char('1') => app.set_race(RaceType::President),
        KeyCode::Char('2') => app.set_race(RaceType::Senate),
        KeyCode::Char('3') => app.set_race(RaceType::House),
        KeyCode::Char('4') => app.set_race(RaceType::Governor),

        // Forecast exits
        KeyCode::Char('P') => app.switch_to_president(),
        KeyCode::Char('b') => app.back_to_results(),

        // Layer toggles
        KeyCode::Char('c') | KeyCode::Char('C') => app.toggle_district_counties(),
        KeyCode::Char('d') | KeyCode::Char('D') => app.toggle_county_dots(),

        // Reset view
        KeyCode::Char('r') | KeyCode::Char('0') => app.reset(),

        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, config: Config, boundaries: election_map::map::Boundaries) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(config, boundaries, size.width, size.height);
    if !app.map_renderer.has_data() {
        log::warn!("no boundary files under {}", app.store.config().geo_dir().display());
    }

    // Main loop
    loop {
        // Finished background loads land before the frame is drawn
        app.tick();

        // Draw
        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                // Only handle key press events (not release)
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(&mut app, key.code),
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                Event::Resize(width, height) => app.resize(width, height),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

use anyhow::{Context, bail};
use crossterm::{
    cursor::{Hide, Show},
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use glyphworks::Config;
use glyphworks::config::parse_hex_color;
use glyphworks::effects::Effect;
use glyphworks::effects::fireworks::FireworksShow;
use std::env;
use std::fs::File;
use std::io::{BufWriter, Stdout, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

fn print_usage() {
    eprintln!("glyphworks - terminal fireworks that spell out a message");
    eprintln!();
    eprintln!("Usage: glyphworks [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config PATH      Read settings from PATH instead of glyphworks.toml");
    eprintln!("  --message TEXT     Text the fireworks spell out");
    eprintln!("  --font PATH        TrueType/OpenType font for the message (default: block font)");
    eprintln!("  --seed N           Seed the random generator for a repeatable show");
    eprintln!("  --bg-color RRGGBB  Set background color as hex (e.g., --bg-color 1a1b26)");
    eprintln!();
    eprintln!("Controls:");
    eprintln!("  click              Launch rockets where you click");
    eprintln!("  space              Launch a rocket that carries the message");
    eprintln!();
    eprintln!("Press 'q', ESC, or Ctrl+C to exit");
}

#[derive(Default)]
struct Args {
    config: Option<PathBuf>,
    message: Option<String>,
    font: Option<PathBuf>,
    seed: Option<u64>,
    bg_color: Option<(u8, u8, u8)>,
}

/// `None` means usage was printed and there is nothing to run.
fn parse_args() -> anyhow::Result<Option<Args>> {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        if matches!(flag, "help" | "--help" | "-h") {
            print_usage();
            return Ok(None);
        }

        let Some(value) = args.get(i + 1) else {
            bail!("{flag} requires a value (see --help)");
        };
        match flag {
            "--config" => parsed.config = Some(PathBuf::from(value)),
            "--message" => parsed.message = Some(value.clone()),
            "--font" => parsed.font = Some(PathBuf::from(value)),
            "--seed" => {
                parsed.seed = Some(value.parse().with_context(|| format!("invalid seed {value:?}"))?);
            }
            "--bg-color" => parsed.bg_color = Some(parse_hex_color(value)?),
            _ => bail!("unknown option: {flag} (see --help)"),
        }
        i += 2;
    }

    Ok(Some(parsed))
}

fn init_logging(path: Option<&Path>) {
    let Some(path) = path else {
        return;
    };
    // The terminal is in raw mode while running, so logs go to a file.
    match File::create(path) {
        Ok(file) => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        Err(e) => eprintln!("Warning: could not open log file {}: {e}", path.display()),
    }
}

fn run_effect<E: Effect>(config: &Config) -> anyhow::Result<()> {
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout());

    terminal::enable_raw_mode().context("could not enable raw mode")?;
    execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All), EnableMouseCapture)?;

    let result = event_loop::<E>(&mut stdout, config);

    execute!(stdout, Show, LeaveAlternateScreen, DisableMouseCapture)?;
    terminal::disable_raw_mode()?;

    result
}

fn event_loop<E: Effect>(stdout: &mut BufWriter<Stdout>, config: &Config) -> anyhow::Result<()> {
    let (cols, rows) = terminal::size()?;
    let mut effect = E::new(cols as usize, rows as usize * 2, config)?;

    let mut last_frame = Instant::now();
    let mut accumulator = 0.0f32;
    let fixed_dt = 1.0 / config.display.fps as f32;

    loop {
        if event::poll(Duration::from_millis(1))? {
            let event = event::read()?;
            match &event {
                Event::Key(key_event) => {
                    if key_event.code == KeyCode::Char('q')
                        || key_event.code == KeyCode::Esc
                        || (key_event.code == KeyCode::Char('c')
                            && key_event.modifiers.contains(event::KeyModifiers::CONTROL))
                    {
                        break;
                    }
                    effect.handle_event(&event);
                }
                Event::Resize(cols, rows) => {
                    effect.resize(*cols as usize, *rows as usize * 2);
                    execute!(stdout, Clear(ClearType::All))?;
                }
                _ => {
                    effect.handle_event(&event);
                }
            }
        }

        let now = Instant::now();
        let frame_time = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        accumulator += frame_time;
        if accumulator > fixed_dt * 3.0 {
            accumulator = fixed_dt * 3.0;
        }

        while accumulator >= fixed_dt {
            effect.update();
            accumulator -= fixed_dt;
        }

        effect.render(stdout)?;
    }

    stdout.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };

    let mut config = Config::load(args.config.as_deref()).context("could not load configuration")?;
    if let Some(message) = args.message {
        config.message.text = message;
    }
    if let Some(font) = args.font {
        config.message.font = Some(font);
    }
    if let Some(seed) = args.seed {
        config.general.seed = Some(seed);
    }
    if let Some(color) = args.bg_color {
        config.display.bg_color = color;
    }

    init_logging(config.general.log_file.as_deref());
    config.log_load_notes();
    log::info!(
        "starting: {} fps, scale {}, hold {} ticks, cadence {}..{}",
        config.display.fps,
        config.display.scale,
        config.message.hold_ticks,
        config.message.cadence_min,
        config.message.cadence_max
    );

    run_effect::<FireworksShow>(&config)
}

//! Build a sample arbor tree, drive it with scripted input and print what it
//! drew.

mod scene;
mod script;

use std::{fs, io, path::PathBuf};

use anyhow::{Context as _, Result, anyhow};
use arbor::{
    DesktopConfig,
    dump::{dump, dump_plain},
    geom::{Expanse, Rect},
    render::Color,
    testing::{DrawCall, Harness},
};
use clap::Parser;
use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL};
use tracing::Level;

use crate::{scene::Scene, script::Step};

/// Drive a sample widget tree from the command line.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Sample tree to build.
    #[clap(short, long, value_enum, default_value = "grid")]
    scene: Scene,

    /// Desktop width in pixels.
    #[clap(long, default_value_t = 80)]
    width: u32,

    /// Desktop height in pixels.
    #[clap(long, default_value_t = 24)]
    height: u32,

    /// TOML file with desktop settings.
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Input step, e.g. click:3,4 or key:tab. Repeatable, applied in order.
    #[clap(short = 'x', long = "step")]
    steps: Vec<Step>,

    /// Print the properties of the node with this identifier. Repeatable.
    #[clap(short, long)]
    properties: Vec<String>,

    /// Log to stderr at this level.
    #[clap(short, long)]
    log: Option<Level>,

    /// Color the tree dump.
    #[clap(long)]
    color: bool,
}

/// Format a rect as `x,y wxh`.
fn rect(r: Rect) -> String {
    format!("{},{} {}x{}", r.tl.x, r.tl.y, r.w, r.h)
}

/// Format a tint as hex.
fn tint(c: Color) -> String {
    format!("#{:02x}{:02x}{:02x}{:02x}", c.r, c.g, c.b, c.a)
}

/// Lay out the draw calls of a frame as a table.
fn draw_table(calls: &[DrawCall]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "op", "texture", "dest", "source", "tint"]);
    for (i, call) in calls.iter().enumerate() {
        let row = match call {
            DrawCall::Draw {
                texture,
                dest,
                source,
                tint: t,
            } => vec![
                Cell::new(i),
                Cell::new("draw").fg(comfy_table::Color::Green),
                Cell::new(texture.0),
                Cell::new(rect(*dest)),
                Cell::new(source.map(rect).unwrap_or_default()),
                Cell::new(tint(*t)),
            ],
            DrawCall::BeginScissor(r) => vec![
                Cell::new(i),
                Cell::new("scissor").fg(comfy_table::Color::Yellow),
                Cell::new(""),
                Cell::new(rect(*r)),
                Cell::new(""),
                Cell::new(""),
            ],
            DrawCall::EndScissor => vec![
                Cell::new(i),
                Cell::new("end scissor").fg(comfy_table::Color::Yellow),
            ],
        };
        table.add_row(row);
    }
    table
}

/// Load desktop settings, falling back to defaults.
fn load_config(path: Option<&PathBuf>) -> Result<DesktopConfig> {
    let Some(path) = path else {
        return Ok(DesktopConfig::default());
    };
    let src = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(DesktopConfig::from_toml(&src)?)
}

pub fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(level) = args.log {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(io::stderr)
            .without_time()
            .compact()
            .init();
    }

    let config = load_config(args.config.as_ref())?;
    let mut h = Harness::with_config(Expanse::new(args.width, args.height), config);
    args.scene.build(h.core_mut())?;
    h.layout();
    for step in &args.steps {
        step.apply(&mut h)
            .with_context(|| format!("applying {step:?}"))?;
    }

    let calls = h.render()?;
    println!("{}", draw_table(&calls));

    let root = h.core().root_id();
    let tree = if args.color {
        dump(h.core(), root)?
    } else {
        dump_plain(h.core(), root)?
    };
    print!("{tree}");

    for name in &args.properties {
        let id = h
            .core()
            .find_by_id(name)
            .ok_or_else(|| anyhow!("no node with identifier {name:?}"))?;
        println!("{name}: {:#}", h.core().property_snapshot(id)?);
    }
    Ok(())
}

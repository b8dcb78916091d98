use famicore::nes::apu::VBLANK_START;
use famicore::prelude::*;
use log::info;
use std::env;
use std::fs;
use std::process;

/// CPU cycles per scanline, rounded up
const CYCLES_PER_SCANLINE: u64 = 114;
const SCANLINES_PER_FRAME: u16 = 262;

enum RunMode {
    Steps { steps: usize },
    Frames { frames: usize },
}

struct Options {
    prg_path: String,
    chr_path: Option<String>,
    mapper: u16,
    run_mode: RunMode,
    log_lines: usize,
}

fn parse_args() -> Options {
    let mut args = env::args().skip(1);
    let mut prg_path: Option<String> = None;
    let mut chr_path: Option<String> = None;
    let mut mapper: u16 = 0;
    let mut steps: Option<usize> = None;
    let mut frames: Option<usize> = None;
    let mut log_lines: usize = 0;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-s" | "--steps" => {
                let val = args.next().unwrap_or_default();
                steps = Some(parse_usize(&val, "steps"));
            }
            "-f" | "--frames" => {
                let val = args.next().unwrap_or_default();
                frames = Some(parse_usize(&val, "frames"));
            }
            "-m" | "--mapper" => {
                let val = args.next().unwrap_or_default();
                mapper = u16::try_from(parse_usize(&val, "mapper")).unwrap_or_else(|_| {
                    eprintln!("Invalid mapper: {val}");
                    print_usage_and_exit();
                });
            }
            "-c" | "--chr" => {
                chr_path = args.next();
            }
            "-l" | "--log" => {
                let val = args.next().unwrap_or_default();
                log_lines = parse_usize(&val, "log");
            }
            _ => {
                if prg_path.is_none() {
                    prg_path = Some(arg);
                } else {
                    eprintln!("Unexpected argument: {arg}");
                    print_usage_and_exit();
                }
            }
        }
    }

    let prg_path = prg_path.unwrap_or_else(|| {
        eprintln!("Missing PRG path.");
        print_usage_and_exit();
    });
    if frames.is_some() && steps.is_some() {
        eprintln!("Provide either --steps or --frames, not both.");
        print_usage_and_exit();
    }
    let run_mode = match frames {
        Some(frames) => RunMode::Frames { frames },
        None => RunMode::Steps {
            steps: steps.unwrap_or(1),
        },
    };

    Options {
        prg_path,
        chr_path,
        mapper,
        run_mode,
        log_lines,
    }
}

fn parse_usize(value: &str, name: &str) -> usize {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => value.parse::<usize>(),
    };
    parsed.unwrap_or_else(|_| {
        eprintln!("Invalid {name}: {value}");
        print_usage_and_exit();
    })
}

fn print_usage_and_exit() -> ! {
    eprintln!("Usage: nes-step <prg_path> [--steps <count> | --frames <count>] [options]");
    eprintln!("Options:");
    eprintln!("  -s, --steps <count>     Instructions to execute (default: 1)");
    eprintln!("  -f, --frames <count>    Frames to run, with per-scanline ticks and vblank NMI");
    eprintln!("  -m, --mapper <number>   Board number (default: 0)");
    eprintln!("  -c, --chr <path>        CHR image (default: 8 KiB CHR-RAM)");
    eprintln!("  -l, --log <count>       Print the last <count> executed instructions");
    process::exit(2);
}

fn read_file(path: &str) -> Vec<u8> {
    fs::read(path).unwrap_or_else(|err| {
        eprintln!("Failed to read '{path}': {err}");
        process::exit(2);
    })
}

fn run_frames(nes: &mut Nes, frames: usize) {
    for _ in 0..frames {
        for scanline in 0..SCANLINES_PER_FRAME {
            if let RunState::Paused { .. } = nes.run_cycles(CYCLES_PER_SCANLINE) {
                return;
            }
            nes.on_hblank(scanline);
            // NullPpu keeps no $2000 NMI-enable bit, so every vblank raises NMI
            if scanline == VBLANK_START {
                nes.nmi();
            }
        }
    }
}

fn main() {
    env_logger::init();
    let opts = parse_args();

    let prg = read_file(&opts.prg_path);
    let chr = opts.chr_path.as_deref().map(read_file).unwrap_or_default();
    let cart = Cartridge::new(prg, chr, opts.mapper, Mirroring::Horizontal).unwrap_or_else(|err| {
        eprintln!("Cartridge error: {err}");
        process::exit(2);
    });

    let config = NesConfig {
        debug_enabled: opts.log_lines > 0,
    };
    let mut nes = Nes::with_cartridge(config, cart);

    match opts.run_mode {
        RunMode::Steps { steps } => {
            for _ in 0..steps {
                if nes.is_paused() {
                    break;
                }
                nes.step();
            }
        }
        RunMode::Frames { frames } => run_frames(&mut nes, frames),
    }
    info!("stopped after {} cycles", nes.cycles());

    if opts.log_lines > 0 {
        for line in nes.cpu().recent_steps(opts.log_lines) {
            println!("{line}");
        }
    }

    match nes.save().to_json() {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("Failed to encode save state: {err}");
            process::exit(1);
        }
    }

    if let Some(err) = &nes.cpu().error {
        eprintln!("CPU error: {err}");
        process::exit(1);
    }
}

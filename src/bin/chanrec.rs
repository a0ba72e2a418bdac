use anyhow::{Context, Result};
use chanrec::audio::{enumerate_input_devices, open_session, CpalBackend, DeviceChoice};
use chanrec::prompt::prompt_directory;
use chanrec::recording::{
    CaptureConfig, ChannelWriter, Destination, Schedule, ScheduleDriver, SegmentRecorder,
    TimeUnit,
};
use chanrec::{RecorderConfig, RecorderError};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "chanrec")]
#[command(about = "Record every input channel to its own WAV file, in segments, with a backup copy")]
#[command(version)]
struct Args {
    /// Main directory for saving recordings
    #[arg(long, alias = "main_dir")]
    main_dir: Option<String>,

    /// Backup directory for saving recordings
    #[arg(long, alias = "backup_dir")]
    backup_dir: Option<String>,

    /// Unit of the total recording time (seconds, minutes, hours)
    #[arg(long, alias = "recording_unit")]
    recording_unit: Option<TimeUnit>,

    /// Total recording time, in --recording-unit
    #[arg(long, alias = "recording_time")]
    recording_time: Option<u64>,

    /// Length of each individual recording, in seconds
    #[arg(long, alias = "recording_length")]
    recording_length: Option<u64>,

    /// Comma-separated names of the channels
    #[arg(long, alias = "channels_names")]
    channels_names: Option<String>,

    /// Number of audio channels to record
    #[arg(long)]
    channels: Option<usize>,

    /// Text between the channel name and the timestamp in file names
    #[arg(long)]
    suffix: Option<String>,

    /// Frames per channel read from the device at a time
    #[arg(long)]
    block_size: Option<usize>,

    /// Record from this input device id instead of asking
    #[arg(long)]
    device: Option<usize>,

    /// Do not ask for directories or a device; use flags, config and defaults
    #[arg(long)]
    no_prompt: bool,

    /// Configuration file [default: chanrec.toml]
    #[arg(long)]
    config: Option<PathBuf>,

    /// List input devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Print the device list as JSON
    #[arg(long, requires = "list_devices")]
    json: bool,
}

impl Args {
    /// Flags win over the configuration file.
    fn merge_into(&self, config: &mut RecorderConfig) {
        if let Some(v) = &self.main_dir {
            config.storage.main_dir = v.clone();
        }
        if let Some(v) = &self.backup_dir {
            config.storage.backup_dir = v.clone();
        }
        if let Some(v) = &self.suffix {
            config.storage.suffix = v.clone();
        }
        if let Some(v) = self.channels {
            config.capture.channels = v;
        }
        if let Some(v) = self.block_size {
            config.capture.block_size = v;
        }
        if let Some(v) = self.recording_unit {
            config.schedule.recording_unit = v;
        }
        if let Some(v) = self.recording_time {
            config.schedule.recording_time = v;
        }
        if let Some(v) = self.recording_length {
            config.schedule.recording_length = v;
        }
        if let Some(v) = &self.channels_names {
            config.schedule.channel_names = v.clone();
        }
    }

    fn device_choice(&self) -> DeviceChoice {
        match (self.device, self.no_prompt) {
            (Some(index), _) => DeviceChoice::Index(index),
            (None, true) => DeviceChoice::First,
            (None, false) => DeviceChoice::Interactive,
        }
    }
}

fn main() -> ExitCode {
    chanrec::init_logging();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let kind = e
                .downcast_ref::<RecorderError>()
                .map(|re| re.kind().to_string())
                .unwrap_or_else(|| "Error".to_string());
            eprintln!("An error of type {} occurred: {}", kind, e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let backend = CpalBackend::new();

    if args.list_devices {
        return list_devices(&backend, args.json);
    }

    let config_path = args.config.clone().unwrap_or_else(RecorderConfig::default_path);
    let mut config = RecorderConfig::load_from_file(&config_path)?;
    args.merge_into(&mut config);
    config.validate()?;

    let labels = config.channel_labels()?;

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();

    let (main_dir, backup_dir) = if args.no_prompt {
        (config.storage.main_dir.clone(), config.storage.backup_dir.clone())
    } else {
        (
            prompt_directory(
                &mut input,
                &mut output,
                "Enter the directory for the main data (leave blank for default)",
                &config.storage.main_dir,
            )?,
            prompt_directory(
                &mut input,
                &mut output,
                "Enter the directory for the backup data (leave blank for default)",
                &config.storage.backup_dir,
            )?,
        )
    };

    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    let destination = Destination::resolve(&main_dir, &backup_dir, &cwd);
    println!("{}", destination.main_root.display());
    println!("{}", destination.backup_root.display());

    let session = open_session(&backend, args.device_choice(), &mut input, &mut output)?;
    drop(input);

    let capture = CaptureConfig::new(
        session.device.index,
        session.sample_rate,
        config.capture.channels,
    )
    .with_block_size(config.capture.block_size);
    let writer = ChannelWriter::new(session.sample_rate).with_suffix(&config.storage.suffix);
    let recorder = SegmentRecorder::new(capture, writer);

    let schedule = Schedule {
        total: config.schedule.recording_time,
        unit: config.schedule.recording_unit,
        segment_length_secs: config.schedule.recording_length,
        labels,
        destination,
    };

    let summary = ScheduleDriver::new(backend, recorder).run(&schedule)?;
    println!(
        "Recorded {} of {} segments, {} files written",
        summary.segments_completed,
        summary.segments_planned,
        summary.files_written()
    );
    Ok(())
}

fn list_devices(backend: &CpalBackend, json: bool) -> Result<()> {
    let devices = enumerate_input_devices(backend)?;
    if json {
        println!("{}", serde_json::to_string(&devices)?);
    } else {
        for d in devices {
            println!(
                "{}: {} ({} channels, {} Hz)",
                d.index, d.name, d.max_input_channels, d.default_sample_rate
            );
        }
    }
    Ok(())
}

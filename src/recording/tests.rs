//! Tests for the recording module

#[cfg(test)]
mod recording_tests {
    use crate::errors::ErrorKind;
    use crate::recording::{
        CaptureConfig, ChannelLabels, ChannelWriter, Destination, DestinationKind, Schedule,
        ScheduleDriver, SegmentRecorder, TimeUnit,
    };
    use crate::testing::SyntheticBackend;
    use tempfile::tempdir;

    fn schedule(total: u64, unit: TimeUnit, length: u64, labels: &str, dest: Destination) -> Schedule {
        Schedule {
            total,
            unit,
            segment_length_secs: length,
            labels: ChannelLabels::parse(labels).unwrap(),
            destination: dest,
        }
    }

    fn driver(backend: SyntheticBackend, channels: usize) -> ScheduleDriver<SyntheticBackend> {
        let config = CaptureConfig::new(0, 8, channels).with_block_size(4);
        ScheduleDriver::new(backend, SegmentRecorder::new(config, ChannelWriter::new(8)))
    }

    #[test]
    fn test_recording_workflow() {
        let dir = tempdir().expect("tempdir");
        let dest = Destination::new(dir.path().join("data"), dir.path().join("backup"));
        let backend = SyntheticBackend::new()
            .with_device("Mic", 2, 8)
            .with_blocks(vec![
                vec![1, 2, 3, 4, 5, 6, 7, 8],
                vec![9, 10, 11, 12, 13, 14, 15, 16],
            ]);
        let observer = backend.clone();

        let summary = driver(backend, 2)
            .run(&schedule(1, TimeUnit::Seconds, 1, "a,b", dest))
            .expect("run");

        assert_eq!(summary.segments_planned, 1);
        assert_eq!(summary.segments_completed, 1);
        assert_eq!(summary.files_written(), 4);

        let order: Vec<(String, DestinationKind)> = summary
            .files
            .iter()
            .map(|f| (f.label.clone(), f.destination))
            .collect();
        assert_eq!(
            order,
            vec![
                ("a".to_string(), DestinationKind::Main),
                ("a".to_string(), DestinationKind::Backup),
                ("b".to_string(), DestinationKind::Main),
                ("b".to_string(), DestinationKind::Backup),
            ]
        );

        let a: Vec<i16> = hound::WavReader::open(&summary.files[0].path)
            .unwrap()
            .into_samples::<i16>()
            .map(|s| s.unwrap())
            .collect();
        assert_eq!(a, vec![1, 3, 5, 7, 9, 11, 13, 15]);

        let stats = observer.stats();
        assert_eq!(stats.terminated, 1);
        assert_eq!(stats.open_now, 0);
    }

    #[test]
    fn test_zero_segments_still_terminates() {
        let dir = tempdir().expect("tempdir");
        let dest = Destination::new(dir.path().join("data"), dir.path().join("backup"));
        let backend = SyntheticBackend::new().with_device("Mic", 2, 8);
        let observer = backend.clone();

        let summary = driver(backend, 2)
            .run(&schedule(30, TimeUnit::Seconds, 60, "a,b", dest))
            .unwrap();

        assert_eq!(summary.segments_planned, 0);
        assert!(summary.files.is_empty());
        assert_eq!(observer.stats().opened, 0);
        assert_eq!(observer.stats().terminated, 1);
        assert!(!dir.path().join("data").exists());
    }

    #[test]
    fn test_invalid_channel_count_checked_per_segment() {
        let dir = tempdir().expect("tempdir");
        let dest = Destination::new(dir.path().join("data"), dir.path().join("backup"));
        let backend = SyntheticBackend::new().with_device("Mic", 2, 8).with_ramp();
        let observer = backend.clone();

        let err = driver(backend, 0)
            .run(&schedule(3, TimeUnit::Seconds, 1, "a", dest))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidChannelCount);
        assert_eq!(observer.stats().opened, 0);
        assert_eq!(observer.stats().terminated, 1);
    }

    #[test]
    fn test_fewer_labels_than_channels_skips_unlabelled() {
        let dir = tempdir().expect("tempdir");
        let dest = Destination::new(dir.path().join("data"), dir.path().join("backup"));
        let backend = SyntheticBackend::new().with_device("Interface", 4, 8).with_ramp();

        let summary = driver(backend, 4)
            .run(&schedule(2, TimeUnit::Seconds, 1, "front,rear", dest))
            .unwrap();

        assert_eq!(summary.segments_completed, 2);
        assert_eq!(summary.files_written(), 2 * 2 * 2);
        assert!(summary.files.iter().all(|f| f.channel < 2));
    }
}

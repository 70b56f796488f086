//! Staging core sources into the build tree.

use crate::edatool::{EdaError, EdaTool};
use crate::util::fs::reset_dir;

impl EdaTool {
    /// Prepare the work root and stage every core.
    ///
    /// The work root is emptied (or created), then each core is fetched
    /// and, when export is enabled, copied to `src_root/<sanitized name>`.
    /// The first failure aborts the pass; cores already staged are left in
    /// place and the next call starts over from an empty work root.
    pub fn configure(&mut self) -> Result<(), EdaError> {
        let work_root = &self.paths.work_root;
        reset_dir(work_root).map_err(|source| EdaError::Filesystem {
            path: work_root.clone(),
            source,
        })?;

        let flags = self.flags();

        for core in self.cores.iter_mut() {
            tracing::info!("Preparing {}", core.name());

            core.fetch().map_err(|source| EdaError::Fetch {
                core: core.name().to_string(),
                source,
            })?;

            if self.config.export {
                let dst = self.paths.staged_dir(&core.sanitized_name());
                let core_flags = flags.toplevel(core.name() == &self.system);

                core.export(&dst, &core_flags)
                    .map_err(|source| EdaError::Export {
                        core: core.name().to_string(),
                        dst: dst.clone(),
                        source,
                    })?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{Core, CoreFile, CoreName, Flow};
    use crate::edatool::{EdaError, EdaTool, ToolConfig};
    use crate::sources::FetchError;
    use crate::test_support::{Event, EventLog, StubCore};
    use std::path::Path;
    use tempfile::TempDir;

    fn engine(root: &Path, cores: Vec<StubCore>, export: bool) -> EdaTool {
        let system = cores
            .last()
            .map(|c| c.name().clone())
            .unwrap_or_else(|| CoreName::parse("top"));
        let cores = cores
            .into_iter()
            .map(|c| Box::new(c) as Box<dyn Core>)
            .collect();
        let config = ToolConfig::new("icarus", Flow::Sim, root).with_export(export);
        EdaTool::with_cores(system, config, cores)
    }

    fn three_cores(log: &EventLog) -> Vec<StubCore> {
        vec![
            StubCore::new("acme:ip:fifo:1.0")
                .with_file(CoreFile::new("fifo.v"))
                .with_log(log),
            StubCore::new("acme:ip:uart:1.0")
                .with_file(CoreFile::new("uart.v"))
                .with_log(log),
            StubCore::new("acme:soc:top:1.0")
                .with_file(CoreFile::new("top.v"))
                .with_log(log),
        ]
    }

    #[test]
    fn test_configure_creates_work_root() {
        let tmp = TempDir::new().unwrap();
        let mut tool = engine(&tmp.path().join("deep/build"), Vec::new(), true);

        tool.configure().unwrap();

        assert!(tool.paths().work_root.is_dir());
        assert_eq!(std::fs::read_dir(&tool.paths().work_root).unwrap().count(), 0);
    }

    #[test]
    fn test_configure_resets_work_root() {
        let tmp = TempDir::new().unwrap();
        let log = EventLog::new();
        let mut tool = engine(tmp.path(), three_cores(&log), true);
        let work_root = tool.paths().work_root.clone();

        tool.configure().unwrap();
        std::fs::write(work_root.join("sim.vvp"), "stale").unwrap();
        std::fs::create_dir_all(work_root.join("obj/deep")).unwrap();
        std::fs::write(work_root.join("obj/deep/x.o"), "stale").unwrap();

        tool.configure().unwrap();

        assert!(work_root.is_dir());
        assert_eq!(std::fs::read_dir(&work_root).unwrap().count(), 0);
        assert_eq!(log.exported().len(), 6);
    }

    #[test]
    fn test_configure_exports_in_order_with_toplevel_flag() {
        let tmp = TempDir::new().unwrap();
        let log = EventLog::new();
        let mut tool = engine(tmp.path(), three_cores(&log), true);

        tool.configure().unwrap();

        let src_root = tool.paths().src_root.clone();
        let exports: Vec<_> = log
            .events()
            .into_iter()
            .filter(|e| matches!(e, Event::Export { .. }))
            .collect();
        assert_eq!(
            exports,
            vec![
                Event::Export {
                    core: "acme:ip:fifo:1.0".to_string(),
                    dst: src_root.join("acme_ip_fifo_1.0"),
                    is_toplevel: false,
                },
                Event::Export {
                    core: "acme:ip:uart:1.0".to_string(),
                    dst: src_root.join("acme_ip_uart_1.0"),
                    is_toplevel: false,
                },
                Event::Export {
                    core: "acme:soc:top:1.0".to_string(),
                    dst: src_root.join("acme_soc_top_1.0"),
                    is_toplevel: true,
                },
            ]
        );
        assert!(src_root.join("acme_ip_uart_1.0/uart.v").exists());
    }

    #[test]
    fn test_configure_without_export_only_fetches() {
        let tmp = TempDir::new().unwrap();
        let log = EventLog::new();
        let mut tool = engine(tmp.path(), three_cores(&log), false);

        tool.configure().unwrap();

        assert_eq!(
            log.events(),
            vec![
                Event::Fetch("acme:ip:fifo:1.0".to_string()),
                Event::Fetch("acme:ip:uart:1.0".to_string()),
                Event::Fetch("acme:soc:top:1.0".to_string()),
            ]
        );
        assert!(!tool.paths().src_root.exists());
    }

    #[test]
    fn test_fetch_failure_aborts_before_later_exports() {
        let tmp = TempDir::new().unwrap();
        let log = EventLog::new();
        let mut cores = three_cores(&log);
        cores[1] = StubCore::new("acme:ip:uart:1.0")
            .failing_fetch()
            .with_log(&log);
        let mut tool = engine(tmp.path(), cores, true);

        let err = tool.configure().unwrap_err();

        match &err {
            EdaError::Fetch { core, source } => {
                assert_eq!(core, "acme:ip:uart:1.0");
                assert!(matches!(source, FetchError::Http { status: 503, .. }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("acme:ip:uart:1.0"));

        assert_eq!(log.exported(), vec!["acme:ip:fifo:1.0".to_string()]);
        assert!(!log
            .events()
            .contains(&Event::Fetch("acme:soc:top:1.0".to_string())));
    }
}

use super::*;

impl TuiApp {
    pub(in crate::tui) fn start_rescan(&mut self) {
        if self.scan_rx.is_some() {
            self.show_message("Rescan already running");
            return;
        }
        let (tx, rx) = mpsc::channel();
        let context = Arc::clone(&self.context);
        let root = self.root.clone();
        info!(root = %root.display(), "Starting rescan");
        thread::spawn(move || {
            let report = context.rescan(&root);
            let _ = tx.send(report);
        });
        self.scan_rx = Some(rx);
        self.scanning = true;
        self.show_message(format!("Scanning {}...", self.root.display()));
    }

    pub(in crate::tui) fn poll_scan_events(&mut self) {
        let Some(rx) = self.scan_rx.take() else {
            return;
        };
        match rx.try_recv() {
            Ok(report) => {
                self.scanning = false;
                self.selected = 0;
                self.scroll = 0;
                self.refresh_rows();
                let mut message = format!("Found {} repositories", report.opened);
                if report.skipped > 0 {
                    message.push_str(&format!(" ({} could not be opened)", report.skipped));
                }
                self.show_message(message);
            }
            Err(TryRecvError::Empty) => self.scan_rx = Some(rx),
            Err(TryRecvError::Disconnected) => {
                self.scanning = false;
                error!("Rescan worker exited without a report");
                self.show_message("Rescan failed");
            }
        }
    }

    pub(in crate::tui) fn poll_task_events(&mut self) {
        while let Ok(event) = self.task_rx.try_recv() {
            let name = display_name(&event.path, &self.root);
            let message = if event.message.is_empty() {
                format!("{} {name}: {}", event.task, event.state)
            } else {
                format!("{} {name}: {}", event.task, event.message)
            };
            self.show_message(message);
        }
    }

    /// Copies the registry into `rows` unless a rescan holds it; the previous
    /// rows stay on screen until then.
    pub(in crate::tui) fn refresh_rows(&mut self) {
        if let Some(rows) = self.context.try_snapshot() {
            self.rows = rows;
            self.selected = clamp_index(self.selected, self.rows.len());
        }
    }

    pub(in crate::tui) fn submit_selected(&mut self, task: RepoTask) {
        let Some(path) = self.selected_row().map(|row| row.path.clone()) else {
            self.show_message("No repository selected");
            return;
        };
        let name = display_name(&path, &self.root);
        match self.context.submit_task(&path, task) {
            Ok(()) => self.show_message(format!("{task} started for {name}")),
            Err(SubmitError::RepositoryBusy(_)) => self.show_message(format!("{name} is busy")),
            Err(err) => self.show_message(format!("{task} not started: {err}")),
        }
        self.refresh_rows();
    }

    pub(in crate::tui) fn submit_bulk(&mut self, task: RepoTask) {
        let accepted = self.context.submit_bulk_task(task);
        self.show_message(format!("{task} started for {accepted} repositories"));
        self.refresh_rows();
    }
}

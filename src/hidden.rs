//! Strategies for reading a line without echoing it.

use crossterm_utils::Result;
use tracing::{trace, warn};

use crate::sys::System;
use crate::{Platform, Shell};

/// A way of reading a line with the terminal echo switched off.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum HiddenStrategy {
    /// Switch echo off with `stty` and read from the input handle.
    Stty,
    /// Run the bundled `hiddeninput.exe` helper.
    WindowsHelper,
    /// Let a Unix shell read the line.
    Shell(Shell),
}

type Probe = fn(&dyn System) -> Option<HiddenStrategy>;

// Checked in order, the first available strategy wins.
const PROBES: [Probe; 3] = [probe_stty, probe_windows, probe_shell];

fn probe_stty(system: &dyn System) -> Option<HiddenStrategy> {
    if system.has_stty() {
        Some(HiddenStrategy::Stty)
    } else {
        None
    }
}

fn probe_windows(system: &dyn System) -> Option<HiddenStrategy> {
    if system.platform() == Platform::Windows {
        Some(HiddenStrategy::WindowsHelper)
    } else {
        None
    }
}

fn probe_shell(system: &dyn System) -> Option<HiddenStrategy> {
    system.get_shell().map(HiddenStrategy::Shell)
}

impl HiddenStrategy {
    /// Returns the first strategy `system` supports, or `None` when there is none.
    ///
    /// Probes run lazily, a strategy found early saves the remaining probes.
    pub fn select(system: &dyn System) -> Option<HiddenStrategy> {
        select_from(system, 0)
    }

    /// Returns the first supported strategy ranked after `failed`.
    ///
    /// Used when `failed` was selected but could not be carried out.
    pub fn select_after(system: &dyn System, failed: HiddenStrategy) -> Option<HiddenStrategy> {
        select_from(system, failed.rank() + 1)
    }

    // Index of the probe producing this strategy.
    fn rank(self) -> usize {
        match self {
            HiddenStrategy::Stty => 0,
            HiddenStrategy::WindowsHelper => 1,
            HiddenStrategy::Shell(_) => 2,
        }
    }
}

fn select_from(system: &dyn System, start: usize) -> Option<HiddenStrategy> {
    let strategy = PROBES
        .iter()
        .skip(start)
        .find_map(|probe| probe(system));
    trace!("selected hidden input strategy: {:?}", strategy);
    strategy
}

/// Keeps the terminal echo switched off while alive.
///
/// Echo is switched back on when the guard is dropped, including during unwinding.
pub struct EchoGuard<'a> {
    system: &'a dyn System,
}

impl<'a> EchoGuard<'a> {
    /// Switches the echo off.
    pub fn disable(system: &'a dyn System) -> Result<EchoGuard<'a>> {
        system.set_echo(false)?;
        Ok(EchoGuard { system })
    }
}

impl<'a> Drop for EchoGuard<'a> {
    fn drop(&mut self) {
        if let Err(e) = self.system.set_echo(true) {
            warn!("unable to restore terminal echo: {:?}", e);
        }
    }
}

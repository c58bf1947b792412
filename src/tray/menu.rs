//! Tray menu management

use super::icon::TrayIcon;
use crate::core::events::{AppEvent, EventSender};
use crate::pedal::PresetId;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tray_icon::{
    menu::{CheckMenuItem, Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem, Submenu},
    TrayIcon as TrayIconHandle, TrayIconBuilder,
};
use tracing::{debug, error, info};

/// Tray menu actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayAction {
    /// Apply the named preset
    ApplyPreset(PresetId),
    /// Save the current configuration as a new preset
    SavePresetAs,
    /// Push the local configuration to the pedal
    Upload,
    /// Replace the local configuration with the pedal's
    Download,
    /// Re-read the local configuration file
    ReloadConfig,
    /// Re-read the hotkey table and rebind
    ReloadHotkeys,
    /// Open the data directory in the file manager
    OpenDataDir,
    /// Quit application
    Quit,
}

type ActionMap = Arc<Mutex<HashMap<MenuId, TrayAction>>>;

/// Tray manager
pub struct TrayManager {
    /// Tray icon handle
    tray: TrayIconHandle,
    icons: TrayIcon,
    presets_menu: Submenu,
    /// Items currently in the presets submenu
    preset_items: Vec<CheckMenuItem>,
    /// Placeholder shown when there are no presets
    empty_item: MenuItem,
    /// Menu id -> action, shared with the menu event thread
    actions: ActionMap,
}

impl TrayManager {
    /// Create the tray icon and start forwarding menu events
    pub fn new(event_tx: EventSender) -> Result<Self> {
        let icons = TrayIcon::new().context("Failed to load tray icons")?;
        let actions: ActionMap = Arc::new(Mutex::new(HashMap::new()));

        let menu = Menu::new();

        let presets_menu = Submenu::new("Presets", true);
        let empty_item = MenuItem::new("(no presets)", false, None);
        presets_menu.append(&empty_item)?;
        menu.append(&presets_menu)?;

        let entries = [
            ("Save current as preset", TrayAction::SavePresetAs),
            ("Upload to pedal", TrayAction::Upload),
            ("Download from pedal", TrayAction::Download),
        ];
        for (label, action) in entries {
            let item = MenuItem::new(label, true, None);
            actions.lock().insert(item.id().clone(), action);
            menu.append(&item)?;
        }
        menu.append(&PredefinedMenuItem::separator())?;

        let entries = [
            ("Reload config", TrayAction::ReloadConfig),
            ("Reload hotkeys", TrayAction::ReloadHotkeys),
            ("Open data folder", TrayAction::OpenDataDir),
        ];
        for (label, action) in entries {
            let item = MenuItem::new(label, true, None);
            actions.lock().insert(item.id().clone(), action);
            menu.append(&item)?;
        }
        menu.append(&PredefinedMenuItem::separator())?;

        let quit_item = MenuItem::new("Quit", true, None);
        actions.lock().insert(quit_item.id().clone(), TrayAction::Quit);
        menu.append(&quit_item)?;

        // Create tray icon
        let tray = TrayIconBuilder::new()
            .with_menu(Box::new(menu))
            .with_tooltip("Pedal Deck")
            .with_icon(icons.idle.clone())
            .build()
            .context("Failed to create tray icon")?;

        info!("Tray icon created");

        let manager = Self {
            tray,
            icons,
            presets_menu,
            preset_items: Vec::new(),
            empty_item,
            actions,
        };

        manager.start_menu_handler(event_tx);

        Ok(manager)
    }

    /// Start menu event handler
    fn start_menu_handler(&self, event_tx: EventSender) {
        let actions = Arc::clone(&self.actions);

        std::thread::spawn(move || {
            let receiver = MenuEvent::receiver();

            while let Ok(event) = receiver.recv() {
                debug!("Menu event: {:?}", event);

                let action = actions.lock().get(&event.id).cloned();
                if let Some(action) = action {
                    if let Err(e) = event_tx.send(AppEvent::TrayAction(action)) {
                        error!("Failed to send tray action: {}", e);
                        break;
                    }
                }
            }
        });
    }

    /// Rebuild the presets submenu, checking `active`
    pub fn set_presets(&mut self, presets: &[PresetId], active: Option<&str>) {
        let mut actions = self.actions.lock();
        for item in self.preset_items.drain(..) {
            actions.remove(item.id());
            if let Err(e) = self.presets_menu.remove(&item) {
                error!("Failed to remove preset menu item: {}", e);
            }
        }

        if presets.is_empty() {
            if self.presets_menu.items().is_empty() {
                if let Err(e) = self.presets_menu.append(&self.empty_item) {
                    error!("Failed to restore empty presets item: {}", e);
                }
            }
            return;
        }
        // The placeholder may already be gone
        let _ = self.presets_menu.remove(&self.empty_item);

        for name in presets {
            let checked = active == Some(name.as_str());
            let item = CheckMenuItem::new(name, true, checked, None);
            if let Err(e) = self.presets_menu.append(&item) {
                error!("Failed to add preset '{}' to menu: {}", name, e);
                continue;
            }
            actions.insert(item.id().clone(), TrayAction::ApplyPreset(name.clone()));
            self.preset_items.push(item);
        }
    }

    /// Reflect the active preset in the icon and tooltip
    pub fn set_status(&mut self, status: &str, preset_active: bool) {
        if let Err(e) = self.tray.set_icon(Some(self.icons.for_state(preset_active).clone())) {
            error!("Failed to set tray icon: {}", e);
        }

        if let Err(e) = self.tray.set_tooltip(Some(status)) {
            error!("Failed to set tray tooltip: {}", e);
        }
    }
}

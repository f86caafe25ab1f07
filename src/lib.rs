/*
 * This file is part of tagtagtag-mixerd.
 *
 * Copyright (C) 2025 tagtagtag-sound contributors
 *
 * tagtagtag-mixerd is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * tagtagtag-mixerd is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with tagtagtag-mixerd. If not, see <https://www.gnu.org/licenses/>.
 */

//! tagtagtag-mixerd - mixer daemon for the tagtagtag sound card
//!
//! Process plumbing around `ttt-core`: command line, logging, signals,
//! the control loop and the daemon lifecycle.

pub mod cli;
pub mod control_loop;
pub mod daemon;
pub mod lifecycle;
pub mod logger;
pub mod signals;

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer. Each service wraps backend crate APIs so that callers get
// async methods returning plain values.

pub mod data_dir;
pub mod library;

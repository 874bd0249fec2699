/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Miscellaneous utilities that are not specific to front coding itself.

*/

pub mod file;

/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Dictionary-like data structures: compact representations that answer
positional or associative queries without decompressing in bulk.

*/

pub mod front_coded_list;

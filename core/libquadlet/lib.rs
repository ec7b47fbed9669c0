// Copyright (c) 2022 Huawei Technologies Co.,Ltd. All rights reserved.
//
// sysMaster is licensed under Mulan PSL v2.
// You can use this software according to the terms and conditions of the Mulan
// PSL v2.
// You may obtain a copy of Mulan PSL v2 at:
//         http://license.coscl.org.cn/MulanPSL2
// THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY
// KIND, EITHER EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO
// NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR PURPOSE.
// See the Mulan PSL v2 for more details.

//! libquadlet
//! systemd generator turning podman quadlet files into services
pub mod constants;
pub mod convert;
pub mod error;
pub mod generator;
pub mod image;
pub mod install;
pub mod kind;
pub mod path_util;
pub mod podman;

pub use convert::{convert, ConvertContext, Conversion, Warning};
pub use error::*;
pub use generator::{GenerateReport, Generator, GeneratorConfig};
pub use kind::UnitKind;

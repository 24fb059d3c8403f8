//! Binding TCP listeners on behalf of unprivileged callers.

use std::io::{self, Write};
use std::net::{SocketAddr, SocketAddrV4, TcpListener};
use std::os::fd::AsFd;

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, warn};

use cfdev_protocol::{BindRequest, BindStatus};

use crate::transport::ConnectionStream;

use super::{DISPATCH_TARGET, DispatchError};

const LISTEN_BACKLOG: i32 = 128;

/// Binds exactly the requested address and port and starts listening.
///
/// There is no retry and no fallback to another port.
pub(crate) fn bind_listener(address: SocketAddrV4) -> io::Result<TcpListener> {
    let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&SocketAddr::V4(address).into())?;
    socket.listen(LISTEN_BACKLOG)?;
    Ok(socket.into())
}

/// Binds the requested listener and replies to the caller.
///
/// On success the listener's descriptor accompanies an all-zero status
/// frame. The helper's own copy is closed when this function returns, whether
/// or not the reply was delivered.
pub(crate) fn handle_bind(
    request: BindRequest,
    stream: &mut ConnectionStream,
) -> Result<BindStatus, DispatchError> {
    let address = request.socket_addr();
    match bind_listener(address) {
        Ok(listener) => {
            let sent = stream.send_with_fd(&BindStatus::Success.encode(), listener.as_fd());
            drop(listener);
            sent.map_err(DispatchError::Write)?;
            debug!(
                target: DISPATCH_TARGET,
                %address,
                "listener transferred to caller"
            );
            Ok(BindStatus::Success)
        }
        Err(error) => {
            let status = BindStatus::from_io_error(&error);
            warn!(
                target: DISPATCH_TARGET,
                %address,
                error = %error,
                status = status.to_byte(),
                "bind failed"
            );
            stream
                .write_all(&status.encode())
                .and_then(|()| stream.flush())
                .map_err(DispatchError::Write)?;
            Ok(status)
        }
    }
}
